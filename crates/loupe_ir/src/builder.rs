//! Bottom-up construction of expression trees.
//!
//! The parser-side builder that turns HDL source into trees lives outside
//! this workspace; [`TreeBuilder`] is the narrow interface it (and the test
//! suites) use to allocate nodes with consistent parent links.

use crate::db::CoverageDb;
use crate::error::IrError;
use crate::expr::{Expression, ParentLink};
use crate::ids::{ExprId, StmtId};
use crate::op::ExprOp;
use crate::stmt::Statement;

/// Allocates nodes in a [`CoverageDb`] and wires parent links.
pub struct TreeBuilder<'a> {
    db: &'a mut CoverageDb,
}

impl<'a> TreeBuilder<'a> {
    /// Creates a builder writing into `db`.
    pub fn new(db: &'a mut CoverageDb) -> Self {
        Self { db }
    }

    /// Allocates a childless node.
    pub fn leaf(&mut self, op: ExprOp, width: u32, line: u32) -> ExprId {
        self.db.exprs.alloc(Expression::new(op, width, line))
    }

    /// Allocates a node with a single (left) operand.
    pub fn unary(
        &mut self,
        op: ExprOp,
        operand: ExprId,
        width: u32,
        line: u32,
    ) -> Result<ExprId, IrError> {
        self.check_detached(operand)?;
        let mut node = Expression::new(op, width, line);
        node.left = Some(operand);
        let id = self.db.exprs.alloc(node);
        self.db.exprs[operand].parent = ParentLink::Expr(id);
        Ok(id)
    }

    /// Allocates a node with two operands.
    pub fn binary(
        &mut self,
        op: ExprOp,
        left: ExprId,
        right: ExprId,
        width: u32,
        line: u32,
    ) -> Result<ExprId, IrError> {
        self.check_detached(left)?;
        self.check_detached(right)?;
        if left == right {
            return Err(IrError::AlreadyAttached(right));
        }
        let mut node = Expression::new(op, width, line);
        node.left = Some(left);
        node.right = Some(right);
        let id = self.db.exprs.alloc(node);
        self.db.exprs[left].parent = ParentLink::Expr(id);
        self.db.exprs[right].parent = ParentLink::Expr(id);
        Ok(id)
    }

    /// Wraps `root` in a new statement.
    pub fn statement(&mut self, root: ExprId) -> Result<StmtId, IrError> {
        self.check_detached(root)?;
        let stmt = self.db.stmts.alloc(Statement::new(root));
        self.db.exprs[root].parent = ParentLink::Stmt(stmt);
        Ok(stmt)
    }

    /// Gives mutable access to a node, e.g. to seed simulation history.
    pub fn node_mut(&mut self, id: ExprId) -> Result<&mut Expression, IrError> {
        self.db.exprs.try_get_mut(id).ok_or(IrError::UnknownExpr(id))
    }

    fn check_detached(&self, id: ExprId) -> Result<(), IrError> {
        let node = self.db.exprs.try_get(id).ok_or(IrError::UnknownExpr(id))?;
        if node.parent != ParentLink::Detached {
            return Err(IrError::AlreadyAttached(id));
        }
        Ok(())
    }
}
