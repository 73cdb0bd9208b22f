//! Lookup errors reported by the combinational engine.
//!
//! Every variant is raised before any aggregate is touched, so a failed
//! request leaves the database exactly as it was. Malformed trees are not
//! represented here: they are upstream bugs and panic instead.

use loupe_ir::{ExprId, ScopeId};

/// Errors returned by exclusion and lookup operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CombError {
    /// No scope with this ID exists.
    #[error("scope {0} not found")]
    ScopeNotFound(ScopeId),

    /// No scope with this name exists.
    #[error("scope '{0}' not found")]
    ScopeNameNotFound(String),

    /// No expression with this ID exists.
    #[error("expression {0} not found")]
    ExprNotFound(ExprId),

    /// The expression exists but none of the scope's statements contains it.
    #[error("expression {expr} is not part of scope {scope}")]
    ExprNotInScope {
        /// The requested expression.
        expr: ExprId,
        /// The scope it was looked up in.
        scope: ScopeId,
    },

    /// No node under the expression carries this underline id.
    #[error("expression {expr} has no sub-expression with underline id {underline}")]
    UnderlineNotFound {
        /// The expression searched.
        expr: ExprId,
        /// The requested underline id.
        underline: u32,
    },
}
