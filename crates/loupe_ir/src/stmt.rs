//! Statements: the logical owners of expression trees.

use crate::ids::ExprId;
use serde::{Deserialize, Serialize};

/// A statement holding one expression tree.
///
/// The statement is the owner of its root for exclusion purposes; excluding
/// the root with line coverage enabled also marks the line excluded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    /// Root of the statement's expression tree.
    pub root: ExprId,
    /// The statement's line was excluded from line coverage.
    #[serde(default)]
    pub line_excluded: bool,
}

impl Statement {
    /// Creates a statement owning `root`.
    pub fn new(root: ExprId) -> Self {
        Self {
            root,
            line_excluded: false,
        }
    }
}
