//! Expression tree model for the loupe coverage engines.
//!
//! This crate defines the data the coverage engines read and annotate:
//! [`Expression`] nodes with their simulator-written supplemental bits,
//! [`Statement`]s that own expression trees, [`Scope`]s that own statements
//! and cache a [`Statistic`], and the [`CoverageDb`] that stores all three in
//! id-keyed arenas. Trees are constructed once by an external builder (see
//! [`TreeBuilder`]) and never rebuilt by the engines.

#![warn(missing_docs)]

pub mod arena;
pub mod bits;
pub mod builder;
pub mod db;
pub mod error;
pub mod expr;
pub mod ids;
pub mod op;
pub mod scope;
pub mod stmt;

pub use arena::{Arena, ArenaId};
pub use bits::{BitHistory, BitMask};
pub use builder::TreeBuilder;
pub use db::CoverageDb;
pub use error::IrError;
pub use expr::{Expression, ParentLink};
pub use ids::{ExprId, ScopeId, StmtId};
pub use op::{ExprOp, OpCategory};
pub use scope::{Scope, ScopeKind, Statistic};
pub use stmt::Statement;
