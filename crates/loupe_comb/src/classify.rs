//! Measurability and chain classification of expression nodes.
//!
//! These are pure functions of the tree shape, the operators, and the
//! current pass's marks; none of them read simulation history.

use crate::marks::PassMarks;
use loupe_config::CombConfig;
use loupe_ir::{CoverageDb, ExprId, Expression, OpCategory};

/// A node's position within a multi-operand and/or chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainRole {
    /// Topmost node of the chain; the chain is scored here.
    Root,
    /// Below the root and sharing its operator family; never scored alone.
    Interior,
    /// An operand feeding the chain whose operator differs from the chain's.
    Boundary,
}

/// Returns `true` if `id` counts toward combinational coverage in this pass.
///
/// Static and control operators, assignment targets, static-only sub-trees
/// and nodes already counted in the current pass are not measurable.
pub fn is_measurable(db: &CoverageDb, id: ExprId, marks: &PassMarks) -> bool {
    is_countable(db, id, marks) && !is_static_only(db, id)
}

/// [`is_measurable`] without the static-only check, for post-order walks
/// that carry the static-only flag up from the children themselves.
pub(crate) fn is_countable(db: &CoverageDb, id: ExprId, marks: &PassMarks) -> bool {
    let node = &db.exprs[id];
    node.category().is_measurable() && !node.lhs && !marks.is_counted(id)
}

/// Returns `true` if every leaf under `id` (inclusive) is a constant.
///
/// Walks the whole sub-tree; tree walks use [`static_only_after`] instead.
pub fn is_static_only(db: &CoverageDb, id: ExprId) -> bool {
    let node = &db.exprs[id];
    static_only_after(node, node.children().all(|child| is_static_only(db, child)))
}

/// The static-only flag of `node` given whether all of its children are
/// static-only.
pub(crate) fn static_only_after(node: &Expression, children_static: bool) -> bool {
    if node.is_leaf() {
        node.category() == OpCategory::Static
    } else {
        children_static
    }
}

/// Returns `true` if `id` is an operand whose truth history is already the
/// evidence of its parent's score.
///
/// Signals, parameters and other value-producing nodes are scored on their
/// own only at the top of a boolean context: the statement root, or directly
/// below a control construct.
pub fn is_subsumed_operand(db: &CoverageDb, id: ExprId) -> bool {
    let node = &db.exprs[id];
    if node.category() != OpCategory::Unary {
        return false;
    }
    node.parent_expr()
        .is_some_and(|parent| db.exprs[parent].category().is_measurable())
}

/// Returns `true` if `id` is an and/or gate with a same-family parent or child.
fn in_chain(db: &CoverageDb, id: ExprId) -> bool {
    let node = &db.exprs[id];
    if !node.category().is_gate() {
        return false;
    }
    let parent_shares = node
        .parent_expr()
        .is_some_and(|p| db.exprs[p].op.same_family(node.op));
    parent_shares || has_same_family_child(db, id)
}

fn has_same_family_child(db: &CoverageDb, id: ExprId) -> bool {
    let node = &db.exprs[id];
    node.children()
        .any(|child| db.exprs[child].op.same_family(node.op))
}

/// Classifies `id` relative to multi-operand chains.
///
/// Returns `None` when chains are disabled or the node takes no part in one.
/// A node that roots its own chain while feeding an enclosing chain of the
/// other family reports [`ChainRole::Root`]; use [`is_chain_boundary`] to ask
/// about the enclosing chain.
pub fn chain_membership(db: &CoverageDb, id: ExprId, cfg: &CombConfig) -> Option<ChainRole> {
    if !cfg.allow_multi_expr {
        return None;
    }
    let node = &db.exprs[id];
    let parent_shares = node
        .parent_expr()
        .is_some_and(|p| db.exprs[p].op.same_family(node.op));
    if node.category().is_gate() {
        if parent_shares {
            return Some(ChainRole::Interior);
        }
        if has_same_family_child(db, id) {
            return Some(ChainRole::Root);
        }
    }
    is_chain_boundary(db, id, cfg).then_some(ChainRole::Boundary)
}

/// Returns `true` if `id` is an operand of a chain: its parent is a chain
/// member and `id` does not share the parent's operator family.
pub fn is_chain_boundary(db: &CoverageDb, id: ExprId, cfg: &CombConfig) -> bool {
    if !cfg.allow_multi_expr {
        return false;
    }
    let node = &db.exprs[id];
    match node.parent_expr() {
        Some(parent) => in_chain(db, parent) && !db.exprs[parent].op.same_family(node.op),
        None => false,
    }
}

/// Returns the boundary operands of the chain rooted at `root`, left to right.
///
/// # Panics
///
/// Panics if a chain member is missing one of its two operands.
pub fn chain_operands(db: &CoverageDb, root: ExprId) -> Vec<ExprId> {
    let mut operands = Vec::new();
    collect_operands(db, root, &mut operands);
    operands
}

fn collect_operands(db: &CoverageDb, id: ExprId, out: &mut Vec<ExprId>) {
    let node = &db.exprs[id];
    let (Some(left), Some(right)) = (node.left, node.right) else {
        panic!("{:?} node {id} is missing an operand", node.op);
    };
    for child in [left, right] {
        if db.exprs[child].op.same_family(node.op) {
            collect_operands(db, child, out);
        } else {
            out.push(child);
        }
    }
}

/// Returns the depth of the child of `node` selected by `is_left_child`.
///
/// Edges into a same-family child are depth-flat, so a whole chain sits at
/// one level; every other edge adds one.
pub fn depth_step(db: &CoverageDb, node: ExprId, is_left_child: bool, depth: u32) -> u32 {
    let parent = &db.exprs[node];
    let child = if is_left_child {
        parent.left
    } else {
        parent.right
    };
    match child {
        Some(child) if parent.op.same_family(db.exprs[child].op) => depth,
        _ => depth + 1,
    }
}

/// Returns the depth of `id` below its statement root (the root is depth 0).
pub fn depth_of(db: &CoverageDb, id: ExprId) -> u32 {
    let mut path: Vec<ExprId> = db.ancestors(id).collect();
    path.reverse();
    path.push(id);
    path.windows(2).fold(0, |depth, pair| {
        let is_left = db.exprs[pair[0]].left == Some(pair[1]);
        depth_step(db, pair[0], is_left, depth)
    })
}
