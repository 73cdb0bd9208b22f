//! Expression nodes and their simulator-written supplemental bits.

use crate::bits::BitHistory;
use crate::ids::{ExprId, StmtId};
use crate::op::{ExprOp, OpCategory};
use serde::{Deserialize, Serialize};

/// Non-owning link from a node to whatever holds it.
///
/// The root of a statement's tree links to the [`Statement`](crate::stmt::Statement);
/// every other node links to its parent expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentLink {
    /// Not yet attached by the builder.
    Detached,
    /// Child of another expression.
    Expr(ExprId),
    /// Root of a statement's tree.
    Stmt(StmtId),
}

/// One evaluable sub-expression.
///
/// Children are exclusively owned: each `ExprId` appears as the child of at
/// most one node. The `was_*`/`eval*` fields are written only by the
/// simulator; the coverage engines write `excluded` and `underline_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expression {
    /// The operator.
    pub op: ExprOp,
    /// Left child (or the sole operand of a unary operator).
    pub left: Option<ExprId>,
    /// Right child.
    pub right: Option<ExprId>,
    /// Back-reference to the owner of this node.
    pub parent: ParentLink,
    /// Width in bits of the value this expression produces.
    pub width: u32,
    /// Source line; 0 for synthetic nodes.
    pub line: u32,
    /// Number of times the simulator executed this expression.
    pub exec_count: u32,
    /// Part of an assignment target; targets are never measured.
    #[serde(default)]
    pub lhs: bool,
    /// The value was observed true at least once.
    pub was_true: bool,
    /// The value was observed false at least once.
    pub was_false: bool,
    /// Inputs (left, right) were observed at (0, 0).
    pub eval00: bool,
    /// Inputs (left, right) were observed at (0, 1).
    pub eval01: bool,
    /// Inputs (left, right) were observed at (1, 0).
    pub eval10: bool,
    /// Inputs (left, right) were observed at (1, 1).
    pub eval11: bool,
    /// Per-bit history, present when the simulator tracked bits individually.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bits: Option<BitHistory>,
    /// Excluded from coverage by the user or a tool.
    #[serde(default)]
    pub excluded: bool,
    /// Sequential per-statement id of an under-covered point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline_id: Option<u32>,
}

impl Expression {
    /// Creates an unattached node with no children and an empty history.
    pub fn new(op: ExprOp, width: u32, line: u32) -> Self {
        Self {
            op,
            left: None,
            right: None,
            parent: ParentLink::Detached,
            width,
            line,
            exec_count: 0,
            lhs: false,
            was_true: false,
            was_false: false,
            eval00: false,
            eval01: false,
            eval10: false,
            eval11: false,
            bits: None,
            excluded: false,
            underline_id: None,
        }
    }

    /// Returns the coverage category of the operator.
    pub fn category(&self) -> OpCategory {
        self.op.category()
    }

    /// Returns `true` if this node is the root of a statement's tree.
    pub fn is_root(&self) -> bool {
        matches!(self.parent, ParentLink::Stmt(_))
    }

    /// Returns the parent expression, if this node has one.
    pub fn parent_expr(&self) -> Option<ExprId> {
        match self.parent {
            ParentLink::Expr(id) => Some(id),
            _ => None,
        }
    }

    /// Returns the children that are present, left first.
    pub fn children(&self) -> impl Iterator<Item = ExprId> {
        self.left.into_iter().chain(self.right)
    }

    /// Returns `true` if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}
