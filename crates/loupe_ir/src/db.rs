//! The container holding every expression, statement, and scope.

use crate::arena::Arena;
use crate::error::IrError;
use crate::expr::{Expression, ParentLink};
use crate::ids::{ExprId, ScopeId, StmtId};
use crate::scope::Scope;
use crate::stmt::Statement;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// All coverage entities of a design, stored in id-keyed arenas.
///
/// Parent links and statement lists hold IDs into these arenas rather than
/// references, so the whole database can be moved, serialized, or wrapped in
/// a lock without fix-ups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageDb {
    /// Expression nodes.
    pub exprs: Arena<ExprId, Expression>,
    /// Statements.
    pub stmts: Arena<StmtId, Statement>,
    /// Scopes.
    pub scopes: Arena<ScopeId, Scope>,
}

impl CoverageDb {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scope and returns its ID.
    pub fn add_scope(&mut self, scope: Scope) -> ScopeId {
        self.scopes.alloc(scope)
    }

    /// Lists `stmt` as part of `scope`.
    pub fn add_statement_to_scope(&mut self, scope: ScopeId, stmt: StmtId) {
        self.scopes[scope].statements.push(stmt);
    }

    /// Records `child` as a child of `parent` in the instance tree.
    pub fn add_child_scope(&mut self, parent: ScopeId, child: ScopeId) {
        self.scopes[parent].children.push(child);
    }

    /// Finds a scope by name.
    pub fn find_scope(&self, name: &str) -> Option<ScopeId> {
        self.scopes
            .iter()
            .find(|(_, scope)| scope.name == name)
            .map(|(id, _)| id)
    }

    /// Returns the ancestors of `expr`, nearest first, excluding `expr` itself.
    pub fn ancestors(&self, expr: ExprId) -> Ancestors<'_> {
        Ancestors {
            db: self,
            next: self.exprs[expr].parent_expr(),
        }
    }

    /// Returns the root of the tree containing `expr`.
    pub fn root_of(&self, expr: ExprId) -> ExprId {
        self.ancestors(expr).last().unwrap_or(expr)
    }

    /// Returns the statement owning the tree that contains `expr`, or `None`
    /// if the tree was never attached to a statement.
    pub fn statement_of(&self, expr: ExprId) -> Option<StmtId> {
        match self.exprs[self.root_of(expr)].parent {
            ParentLink::Stmt(stmt) => Some(stmt),
            _ => None,
        }
    }

    /// Returns every node under `root` (inclusive) in left-then-right post-order.
    pub fn subtree(&self, root: ExprId) -> Vec<ExprId> {
        let mut out = Vec::new();
        self.push_post_order(root, &mut out);
        out
    }

    fn push_post_order(&self, id: ExprId, out: &mut Vec<ExprId>) {
        let node = &self.exprs[id];
        if let Some(left) = node.left {
            self.push_post_order(left, out);
        }
        if let Some(right) = node.right {
            self.push_post_order(right, out);
        }
        out.push(id);
    }

    /// Returns the scopes whose statement lists include `stmt`.
    pub fn scopes_listing(&self, stmt: StmtId) -> Vec<ScopeId> {
        self.scopes
            .iter()
            .filter(|(_, scope)| scope.statements.contains(&stmt))
            .map(|(id, _)| id)
            .collect()
    }

    /// Serializes the database to a JSON snapshot.
    pub fn to_json(&self) -> Result<String, IrError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restores a database from a JSON snapshot and [validates](Self::validate) it.
    pub fn from_json(json: &str) -> Result<Self, IrError> {
        let db: Self = serde_json::from_str(json)?;
        db.validate()?;
        Ok(db)
    }

    /// Checks the cross-references the snapshot schema cannot express.
    ///
    /// Every id must name an existing entity, parent and child links must
    /// agree, each statement root must link back to its statement, and no
    /// expression may be its own ancestor.
    pub fn validate(&self) -> Result<(), IrError> {
        for (id, node) in self.exprs.iter() {
            if node.left.is_some() && node.left == node.right {
                return Err(inconsistent(format!("{id} uses the same child twice")));
            }
            for child in [node.left, node.right].into_iter().flatten() {
                match self.exprs.try_get(child) {
                    None => return Err(inconsistent(format!("{id} names missing child {child}"))),
                    Some(c) if c.parent != ParentLink::Expr(id) => {
                        return Err(inconsistent(format!(
                            "{child} is a child of {id} but links elsewhere"
                        )));
                    }
                    Some(_) => {}
                }
            }
            match node.parent {
                ParentLink::Detached => {}
                ParentLink::Expr(parent) => {
                    let owned = self
                        .exprs
                        .try_get(parent)
                        .is_some_and(|p| p.left == Some(id) || p.right == Some(id));
                    if !owned {
                        return Err(inconsistent(format!(
                            "{id} links to parent {parent}, which does not hold it"
                        )));
                    }
                }
                ParentLink::Stmt(stmt) => {
                    if self.stmts.try_get(stmt).map(|s| s.root) != Some(id) {
                        return Err(inconsistent(format!(
                            "{id} links to statement {stmt}, which is not rooted at it"
                        )));
                    }
                }
            }
        }

        for (id, stmt) in self.stmts.iter() {
            match self.exprs.try_get(stmt.root) {
                None => {
                    return Err(inconsistent(format!("{id} names missing root {}", stmt.root)));
                }
                Some(root) if root.parent != ParentLink::Stmt(id) => {
                    return Err(inconsistent(format!(
                        "root {} of {id} does not link back to it",
                        stmt.root
                    )));
                }
                Some(_) => {}
            }
        }

        for (id, scope) in self.scopes.iter() {
            if let Some(stmt) = scope.statements.iter().find(|&&s| !self.stmts.contains(s)) {
                return Err(inconsistent(format!("scope {id} lists missing statement {stmt}")));
            }
            if let Some(child) = scope.children.iter().find(|&&c| !self.scopes.contains(c)) {
                return Err(inconsistent(format!("scope {id} lists missing child scope {child}")));
            }
        }

        self.check_acyclic()
    }

    /// Follows every parent chain once; reaching a node still on the current
    /// chain means a cycle.
    fn check_acyclic(&self) -> Result<(), IrError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Visit {
            New,
            OnPath,
            Done,
        }

        let mut state = vec![Visit::New; self.exprs.len()];
        let mut path = Vec::new();
        for start in self.exprs.ids() {
            let mut next = Some(start);
            while let Some(id) = next {
                let slot = &mut state[id.as_raw() as usize];
                match *slot {
                    Visit::Done => break,
                    Visit::OnPath => {
                        return Err(inconsistent(format!("{id} is its own ancestor")));
                    }
                    Visit::New => {
                        *slot = Visit::OnPath;
                        path.push(id);
                        next = self.exprs[id].parent_expr();
                    }
                }
            }
            for id in path.drain(..) {
                state[id.as_raw() as usize] = Visit::Done;
            }
        }
        Ok(())
    }

    /// Reads a JSON snapshot from `path`.
    pub fn load(path: &Path) -> Result<Self, IrError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Writes a JSON snapshot to `path`.
    pub fn save(&self, path: &Path) -> Result<(), IrError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

fn inconsistent(detail: String) -> IrError {
    IrError::Inconsistent(detail)
}

/// Iterator over the ancestor chain of an expression.
pub struct Ancestors<'a> {
    db: &'a CoverageDb,
    next: Option<ExprId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ExprId;

    fn next(&mut self) -> Option<ExprId> {
        let current = self.next?;
        self.next = self.db.exprs[current].parent_expr();
        Some(current)
    }
}
