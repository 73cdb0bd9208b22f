//! Combinational logic coverage for the loupe coverage tool.
//!
//! Given expression trees whose nodes carry simulation history, this crate
//! decides which input/output combinations of each measurable
//! sub-expression were observed, rolls the results up into per-scope
//! [`Statistic`](loupe_ir::Statistic)s, and keeps those statistics exact
//! while the user excludes and re-includes individual sub-expressions.
//!
//! # Scoring
//!
//! | node | points |
//! |---|---|
//! | AND pair | left false, right false, both true |
//! | OR pair | left true, right true, both false |
//! | comparison | all four joint input values |
//! | event | fired |
//! | value at the top of a boolean context | true, false |
//! | and/or chain of *n* operands | one per operand, plus all true / all false |
//!
//! With bitwise scoring every point of a wide node is counted per bit.
//!
//! # Modules
//!
//! - `classify`: measurability, chain roles, depth
//! - `points`: expansion of a node into coverage points
//! - `stats`: tree and scope statistics, underline numbering
//! - `detail`: missing-point rows for report renderers
//! - `exclude`: exclusion toggling with incremental statistic repair
//! - `engine`: [`CombEngine`], the configured entry point

#![warn(missing_docs)]

pub mod classify;
pub mod detail;
pub mod engine;
pub mod error;
pub mod exclude;
pub mod marks;
pub mod points;
pub mod stats;

pub use classify::{chain_membership, depth_step, is_measurable, ChainRole};
pub use detail::{missing_detail, statement_detail, DetailRow};
pub use engine::{scope_by_name, CombEngine};
pub use error::CombError;
pub use exclude::{find_by_underline, set_exclusion, set_exclusion_by_underline, ExclusionOutcome};
pub use marks::PassMarks;
pub use points::{CoveragePoint, PointKind};
pub use stats::{
    collect_expressions, compute_tree_stats, hierarchy_summary, recalc_scope, reset_underlines,
    ExprSummary, ExpressionLists, TreeStats,
};
