//! Structured descriptions of what an under-covered expression is missing.
//!
//! Rows come straight from the same [`CoveragePoint`] lists the calculator
//! counts, so a node with `total - hit == n` yields exactly `n` rows.

use crate::classify::{depth_of, depth_step, is_static_only, static_only_after};
use crate::points::{node_points, CoveragePoint, PointKind};
use loupe_config::CombConfig;
use loupe_ir::{CoverageDb, ExprId, StmtId};

/// One unmet coverage point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailRow {
    /// The scored node (a chain's root for chain points).
    pub expr: ExprId,
    /// The node the renderer underlines for this point.
    pub at: ExprId,
    /// Underline id of `at`, if one has been assigned.
    pub underline_id: Option<u32>,
    /// The combination that was never observed.
    pub missing: PointKind,
    /// Bit index when scored bitwise.
    pub bit: Option<u32>,
}

impl DetailRow {
    /// A short human-readable description of the missing combination.
    pub fn describe(&self) -> String {
        let what = match self.missing {
            PointKind::LeftFalse => "left input never drove the AND false".to_string(),
            PointKind::RightFalse => "right input never drove the AND false".to_string(),
            PointKind::BothTrue => "inputs never jointly (1,1)".to_string(),
            PointKind::LeftTrue => "left input never drove the OR true".to_string(),
            PointKind::RightTrue => "right input never drove the OR true".to_string(),
            PointKind::BothFalse => "inputs never jointly (0,0)".to_string(),
            PointKind::Joint { left, right } => {
                format!("inputs never jointly ({},{})", u8::from(left), u8::from(right))
            }
            PointKind::EventFired => "event never occurred".to_string(),
            PointKind::ValueTrue => "value never true".to_string(),
            PointKind::ValueFalse => "value never false".to_string(),
            PointKind::OperandFalse => format!("operand {} never false", self.at),
            PointKind::OperandTrue => format!("operand {} never true", self.at),
            PointKind::AllTrue => "operands never all true".to_string(),
            PointKind::AllFalse => "operands never all false".to_string(),
        };
        match self.bit {
            Some(bit) => format!("bit {bit}: {what}"),
            None => what,
        }
    }
}

fn effectively_excluded(db: &CoverageDb, id: ExprId) -> bool {
    db.exprs[id].excluded || db.ancestors(id).any(|a| db.exprs[a].excluded)
}

/// Returns the points `id` is scored on, or `None` if the node is not scored
/// on its own under `cfg`.
pub fn scored_points(db: &CoverageDb, id: ExprId, cfg: &CombConfig) -> Option<Vec<CoveragePoint>> {
    let place = Placement {
        depth: depth_of(db, id),
        excluded: effectively_excluded(db, id),
        static_only: is_static_only(db, id),
    };
    points_at(db, id, cfg, place)
}

/// Where a node sits in its tree, as far as scoring cares.
#[derive(Clone, Copy)]
struct Placement {
    depth: u32,
    excluded: bool,
    static_only: bool,
}

fn points_at(
    db: &CoverageDb,
    id: ExprId,
    cfg: &CombConfig,
    place: Placement,
) -> Option<Vec<CoveragePoint>> {
    let node = &db.exprs[id];
    if !node.category().is_measurable() || node.lhs || place.static_only {
        return None;
    }
    if cfg.depth_budget.is_some_and(|budget| place.depth > budget) {
        return None;
    }
    node_points(db, id, cfg, place.excluded)
}

fn rows_from(db: &CoverageDb, id: ExprId, points: Option<Vec<CoveragePoint>>) -> Vec<DetailRow> {
    points
        .unwrap_or_default()
        .into_iter()
        .filter(|p| !p.is_covered())
        .map(|p| DetailRow {
            expr: id,
            at: p.at,
            underline_id: db.exprs[p.at].underline_id,
            missing: p.kind,
            bit: p.bit,
        })
        .collect()
}

/// Lists the unmet coverage points of `id`.
///
/// Empty for nodes that are fully covered, excluded, or not scored on their
/// own. For a chain root the rows cover each boundary operand and the
/// chain's all-true/all-false case.
pub fn missing_detail(db: &CoverageDb, id: ExprId, cfg: &CombConfig) -> Vec<DetailRow> {
    rows_from(db, id, scored_points(db, id, cfg))
}

/// Lists the unmet coverage points of every node in a statement's tree, in
/// post-order.
pub fn statement_detail(db: &CoverageDb, stmt: StmtId, cfg: &CombConfig) -> Vec<DetailRow> {
    let mut rows = Vec::new();
    collect_rows(db, db.stmts[stmt].root, cfg, 0, false, &mut rows);
    rows
}

/// Post-order walk carrying depth and exclusion down and the static-only
/// flag up, so each node is placed in constant time.
fn collect_rows(
    db: &CoverageDb,
    id: ExprId,
    cfg: &CombConfig,
    depth: u32,
    ancestor_excluded: bool,
    out: &mut Vec<DetailRow>,
) -> bool {
    let node = &db.exprs[id];
    let excluded = ancestor_excluded || node.excluded;
    let mut children_static = true;
    if let Some(left) = node.left {
        children_static &=
            collect_rows(db, left, cfg, depth_step(db, id, true, depth), excluded, out);
    }
    if let Some(right) = node.right {
        children_static &=
            collect_rows(db, right, cfg, depth_step(db, id, false, depth), excluded, out);
    }
    let place = Placement {
        depth,
        excluded,
        static_only: static_only_after(node, children_static),
    };
    out.extend(rows_from(db, id, points_at(db, id, cfg, place)));
    place.static_only
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marks::PassMarks;
    use crate::stats::compute_tree_stats;
    use loupe_ir::{ExprOp, TreeBuilder};

    #[test]
    fn and_pair_reports_missing_right_false() {
        let mut db = CoverageDb::new();
        let mut b = TreeBuilder::new(&mut db);
        let x = b.leaf(ExprOp::Signal, 1, 1);
        let y = b.leaf(ExprOp::Signal, 1, 1);
        let and = b.binary(ExprOp::And, x, y, 1, 1).unwrap();
        let stmt = b.statement(and).unwrap();
        db.exprs[x].was_false = true;
        db.exprs[and].eval11 = true;
        let cfg = CombConfig::default();
        let mut marks = PassMarks::new(db.exprs.len());
        compute_tree_stats(&mut db, and, &cfg, &mut marks);

        let rows = statement_detail(&db, stmt, &cfg);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].expr, and);
        assert_eq!(rows[0].missing, PointKind::RightFalse);
        assert_eq!(rows[0].underline_id, Some(1));
        assert_eq!(rows[0].describe(), "right input never drove the AND false");
    }

    #[test]
    fn statement_walk_matches_per_node_detail() {
        // !(K == x) & (y < (K2 + K3)) with the right arm excluded and a
        // depth budget that cuts off the comparison operands.
        let mut db = CoverageDb::new();
        let mut b = TreeBuilder::new(&mut db);
        let k = b.leaf(ExprOp::Static, 4, 1);
        let x = b.leaf(ExprOp::Signal, 4, 1);
        let eq = b.binary(ExprOp::Eq, k, x, 1, 1).unwrap();
        let not = b.unary(ExprOp::Not, eq, 1, 1).unwrap();
        let y = b.leaf(ExprOp::Signal, 4, 1);
        let k2 = b.leaf(ExprOp::Static, 4, 1);
        let k3 = b.leaf(ExprOp::Static, 4, 1);
        let sum = b.binary(ExprOp::Add, k2, k3, 4, 1).unwrap();
        let lt = b.binary(ExprOp::Lt, y, sum, 1, 1).unwrap();
        let root = b.binary(ExprOp::And, not, lt, 1, 1).unwrap();
        let stmt = b.statement(root).unwrap();
        db.exprs[lt].excluded = true;

        for depth_budget in [None, Some(0), Some(1), Some(2)] {
            let cfg = CombConfig {
                depth_budget,
                ..CombConfig::default()
            };
            let per_node: Vec<_> = db
                .subtree(root)
                .into_iter()
                .flat_map(|id| missing_detail(&db, id, &cfg))
                .collect();
            assert_eq!(statement_detail(&db, stmt, &cfg), per_node, "{depth_budget:?}");
        }
        let cfg = CombConfig::default();
        assert!(missing_detail(&db, sum, &cfg).is_empty());
        assert!(missing_detail(&db, lt, &cfg).is_empty());
        assert_eq!(missing_detail(&db, eq, &cfg).len(), 4);
    }

    #[test]
    fn chain_rows_mirror_chain_points() {
        // a | b | c with only b ever true and never all false.
        let mut db = CoverageDb::new();
        let mut b = TreeBuilder::new(&mut db);
        let a = b.leaf(ExprOp::Signal, 1, 1);
        let bb = b.leaf(ExprOp::Signal, 1, 1);
        let ab = b.binary(ExprOp::Or, a, bb, 1, 1).unwrap();
        let c = b.leaf(ExprOp::Signal, 1, 1);
        let root = b.binary(ExprOp::Or, ab, c, 1, 1).unwrap();
        b.statement(root).unwrap();
        db.exprs[bb].was_true = true;
        let cfg = CombConfig::default();

        let rows = missing_detail(&db, root, &cfg);
        let kinds: Vec<_> = rows.iter().map(|r| (r.at, r.missing)).collect();
        assert_eq!(
            kinds,
            vec![
                (a, PointKind::OperandTrue),
                (c, PointKind::OperandTrue),
                (root, PointKind::AllFalse),
            ]
        );
        assert!(missing_detail(&db, ab, &cfg).is_empty());
        assert_eq!(rows[0].describe(), format!("operand {a} never true"));
    }

    #[test]
    fn excluded_nodes_have_no_rows() {
        let mut db = CoverageDb::new();
        let mut b = TreeBuilder::new(&mut db);
        let x = b.leaf(ExprOp::Signal, 4, 1);
        let y = b.leaf(ExprOp::Signal, 4, 1);
        let eq = b.binary(ExprOp::Eq, x, y, 1, 1).unwrap();
        let z = b.leaf(ExprOp::Signal, 1, 1);
        let root = b.binary(ExprOp::And, eq, z, 1, 1).unwrap();
        b.statement(root).unwrap();
        let cfg = CombConfig::default();
        assert_eq!(missing_detail(&db, eq, &cfg).len(), 4);
        db.exprs[root].excluded = true;
        assert!(missing_detail(&db, eq, &cfg).is_empty());
        assert!(missing_detail(&db, root, &cfg).is_empty());
    }

    #[test]
    fn describe_joint_and_bits() {
        let row = DetailRow {
            expr: ExprId::from_raw(0),
            at: ExprId::from_raw(0),
            underline_id: None,
            missing: PointKind::Joint {
                left: true,
                right: false,
            },
            bit: Some(3),
        };
        assert_eq!(row.describe(), "bit 3: inputs never jointly (1,0)");
    }

    #[test]
    fn depth_budget_hides_deep_rows() {
        let mut db = CoverageDb::new();
        let mut b = TreeBuilder::new(&mut db);
        let x = b.leaf(ExprOp::Signal, 1, 1);
        let y = b.leaf(ExprOp::Signal, 1, 1);
        let eq = b.binary(ExprOp::Eq, x, y, 1, 1).unwrap();
        let ev = b.unary(ExprOp::AnyEdge, eq, 1, 1).unwrap();
        b.statement(ev).unwrap();
        let cfg = CombConfig {
            depth_budget: Some(0),
            ..CombConfig::default()
        };
        assert!(missing_detail(&db, eq, &cfg).is_empty());
        assert_eq!(missing_detail(&db, ev, &cfg).len(), 1);
    }
}
