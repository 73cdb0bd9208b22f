//! The coverage statistics calculator.
//!
//! [`compute_tree_stats`] walks one statement's tree children-first, scores
//! every measurable node (or chain) through [`node_points`], and numbers the
//! under-covered points with per-statement underline ids. Scope-level
//! functions sum those results into each scope's cached [`Statistic`].

use crate::classify::{depth_step, is_countable, static_only_after};
use crate::error::CombError;
use crate::marks::PassMarks;
use crate::points::{node_points, CoveragePoint};
use loupe_config::CombConfig;
use loupe_ir::{CoverageDb, ExprId, ScopeId, Statistic, StmtId};
use std::collections::HashMap;

/// Combinational counts for one tree or one scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Points that read as covered, including excluded ones.
    pub hit: u32,
    /// All scored points.
    pub total: u32,
    /// Points covered only because they are excluded.
    pub excluded: u32,
}

impl TreeStats {
    fn add(&mut self, other: TreeStats) {
        self.hit += other.hit;
        self.total += other.total;
        self.excluded += other.excluded;
    }

    /// Returns `true` when every point reads as covered.
    pub fn is_complete(&self) -> bool {
        self.hit == self.total
    }
}

/// Result of scoring a tree without touching it.
#[derive(Debug, Default)]
pub(crate) struct TreeScore {
    pub stats: TreeStats,
    /// Underline changes to apply: `Some` assigns, `None` clears.
    pub underlines: Vec<(ExprId, Option<u32>)>,
}

struct Walker<'a> {
    db: &'a CoverageDb,
    cfg: &'a CombConfig,
    marks: &'a mut PassMarks,
    next_ulid: u32,
    /// Underline ids as they stand during this walk.
    current: HashMap<ExprId, Option<u32>>,
    score: TreeScore,
}

impl Walker<'_> {
    fn underline(&self, id: ExprId) -> Option<u32> {
        match self.current.get(&id) {
            Some(ulid) => *ulid,
            None => self.db.exprs[id].underline_id,
        }
    }

    fn set_underline(&mut self, id: ExprId, ulid: Option<u32>) {
        if self.underline(id) != ulid {
            self.current.insert(id, ulid);
            self.score.underlines.push((id, ulid));
        }
    }

    /// Scores the sub-tree under `id` children-first and returns whether it
    /// is static-only.
    fn walk(&mut self, id: ExprId, depth: u32, ancestor_excluded: bool) -> bool {
        let db = self.db;
        let node = &db.exprs[id];
        let excluded = ancestor_excluded || node.excluded;
        let mut children_static = true;
        if let Some(left) = node.left {
            children_static &= self.walk(left, depth_step(db, id, true, depth), excluded);
        }
        if let Some(right) = node.right {
            children_static &= self.walk(right, depth_step(db, id, false, depth), excluded);
        }
        let static_only = static_only_after(node, children_static);

        if self.cfg.depth_budget.is_some_and(|budget| depth > budget) {
            return static_only;
        }
        if static_only || !is_countable(db, id, self.marks) {
            return static_only;
        }
        self.marks.mark(id);

        if let Some(points) = node_points(db, id, self.cfg, excluded) {
            self.tally(id, &points);
        }
        static_only
    }

    fn tally(&mut self, id: ExprId, points: &[CoveragePoint]) {
        let mut stats = TreeStats::default();
        let mut missing = false;
        for point in points {
            stats.total += 1;
            if point.excluded {
                stats.hit += 1;
                if !point.hit {
                    stats.excluded += 1;
                }
            } else if point.hit {
                stats.hit += 1;
            } else {
                missing = true;
            }
        }
        log::trace!(
            "scored {id} ({:?}): {}/{} hit, {} excluded",
            self.db.exprs[id].op,
            stats.hit,
            stats.total,
            stats.excluded
        );
        self.score.stats.add(stats);

        let mut seen: Vec<ExprId> = Vec::new();
        for point in points {
            if seen.contains(&point.at) {
                continue;
            }
            seen.push(point.at);
            if point.excluded {
                self.set_underline(point.at, None);
            } else if missing && self.underline(point.at).is_none() {
                let ulid = self.next_ulid;
                self.next_ulid += 1;
                self.set_underline(point.at, Some(ulid));
            }
        }
    }
}

/// Scores the tree under `root` without mutating the database.
pub(crate) fn score_tree(
    db: &CoverageDb,
    root: ExprId,
    cfg: &CombConfig,
    marks: &mut PassMarks,
) -> TreeScore {
    let next_ulid = db
        .subtree(root)
        .into_iter()
        .filter_map(|id| db.exprs[id].underline_id)
        .max()
        .unwrap_or(0)
        + 1;
    let mut walker = Walker {
        db,
        cfg,
        marks,
        next_ulid,
        current: HashMap::new(),
        score: TreeScore::default(),
    };
    walker.walk(root, 0, false);
    walker.score
}

/// Computes `(hit, total, excluded)` for the tree under `root` and assigns
/// underline ids to its under-covered points.
///
/// Ids continue after the highest id already present in the tree, and a
/// node that already carries one keeps it. Excluded nodes lose theirs.
/// Nodes counted earlier in the same pass (per `marks`) are skipped.
pub fn compute_tree_stats(
    db: &mut CoverageDb,
    root: ExprId,
    cfg: &CombConfig,
    marks: &mut PassMarks,
) -> TreeStats {
    let score = score_tree(db, root, cfg, marks);
    for (id, ulid) in score.underlines {
        db.exprs[id].underline_id = ulid;
    }
    score.stats
}

/// Returns `true` if the statement rooted at `root` takes part in line
/// coverage: a control root or a synthetic (line 0) root never does.
pub(crate) fn has_line(db: &CoverageDb, stmt: StmtId) -> bool {
    let root = &db.exprs[db.stmts[stmt].root];
    !root.op.is_control() && root.line != 0
}

/// Recomputes the combinational and line counters of `scope` from scratch
/// and stores them in the scope's cached statistic.
pub fn recalc_scope(
    db: &mut CoverageDb,
    scope: ScopeId,
    cfg: &CombConfig,
) -> Result<Statistic, CombError> {
    let statements = db
        .scopes
        .try_get(scope)
        .ok_or(CombError::ScopeNotFound(scope))?
        .statements
        .clone();
    let mut marks = PassMarks::new(db.exprs.len());
    let mut comb = TreeStats::default();
    let mut stat = Statistic::default();

    for stmt in statements {
        let root = db.stmts[stmt].root;
        if marks.is_counted(root) {
            continue;
        }
        comb.add(compute_tree_stats(db, root, cfg, &mut marks));
        marks.mark(root);

        if has_line(db, stmt) {
            stat.line_total += 1;
            if db.exprs[root].exec_count > 0 {
                stat.line_hit += 1;
            } else if db.stmts[stmt].line_excluded {
                stat.line_hit += 1;
                stat.line_excluded += 1;
            }
        }
    }

    stat.comb_hit = comb.hit;
    stat.comb_total = comb.total;
    stat.comb_excluded = comb.excluded;
    log::debug!(
        "recalculated {} '{}': comb {}/{} ({} excluded), line {}/{}",
        scope,
        db.scopes[scope].name,
        stat.comb_hit,
        stat.comb_total,
        stat.comb_excluded,
        stat.line_hit,
        stat.line_total
    );
    db.scopes[scope].stat = stat;
    Ok(stat)
}

/// Sums the cached statistic of `scope` and of every scope below it in the
/// instance tree.
pub fn hierarchy_summary(db: &CoverageDb, scope: ScopeId) -> Result<Statistic, CombError> {
    if !db.scopes.contains(scope) {
        return Err(CombError::ScopeNotFound(scope));
    }
    let mut total = Statistic::default();
    let mut visited = Vec::new();
    let mut stack = vec![scope];
    while let Some(current) = stack.pop() {
        if visited.contains(&current) {
            continue;
        }
        visited.push(current);
        let s = &db.scopes[current];
        total.accumulate(&s.stat);
        stack.extend(s.children.iter().rev().copied());
    }
    Ok(total)
}

/// Clears every underline id in the statement's tree.
pub fn reset_underlines(db: &mut CoverageDb, stmt: StmtId) {
    let root = db.stmts[stmt].root;
    for id in db.subtree(root) {
        db.exprs[id].underline_id = None;
    }
}

/// A statement root as listed in covered/uncovered views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprSummary {
    /// The statement root.
    pub expr: ExprId,
    /// Its source line.
    pub line: u32,
    /// The root itself is excluded.
    pub excluded: bool,
    /// Counts for the whole tree.
    pub stats: TreeStats,
}

/// Statement roots of a scope split by whether their trees are fully covered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionLists {
    /// Trees with every point covered (excluded points count as covered).
    pub covered: Vec<ExprSummary>,
    /// Trees with at least one missing point.
    pub uncovered: Vec<ExprSummary>,
}

/// Lists the scope's statement roots with their coverage, without changing
/// underline ids or cached statistics. Roots with no scored points are
/// omitted.
pub fn collect_expressions(
    db: &CoverageDb,
    scope: ScopeId,
    cfg: &CombConfig,
) -> Result<ExpressionLists, CombError> {
    let s = db.scopes.try_get(scope).ok_or(CombError::ScopeNotFound(scope))?;
    let mut marks = PassMarks::new(db.exprs.len());
    let mut lists = ExpressionLists::default();
    for &stmt in &s.statements {
        let root = db.stmts[stmt].root;
        if marks.is_counted(root) {
            continue;
        }
        let stats = score_tree(db, root, cfg, &mut marks).stats;
        marks.mark(root);
        if stats.total == 0 {
            continue;
        }
        let node = &db.exprs[root];
        let summary = ExprSummary {
            expr: root,
            line: node.line,
            excluded: node.excluded,
            stats,
        };
        if stats.is_complete() {
            lists.covered.push(summary);
        } else {
            lists.uncovered.push(summary);
        }
    }
    Ok(lists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loupe_ir::{ExprOp, Scope, ScopeKind, TreeBuilder};

    fn single_statement(
        build: impl FnOnce(&mut TreeBuilder<'_>) -> ExprId,
    ) -> (CoverageDb, ScopeId, StmtId, ExprId) {
        let mut db = CoverageDb::new();
        let scope = db.add_scope(Scope::new("top", ScopeKind::Module));
        let mut b = TreeBuilder::new(&mut db);
        let root = build(&mut b);
        let stmt = b.statement(root).unwrap();
        db.add_statement_to_scope(scope, stmt);
        (db, scope, stmt, root)
    }

    fn stats_of(db: &mut CoverageDb, root: ExprId, cfg: &CombConfig) -> TreeStats {
        let mut marks = PassMarks::new(db.exprs.len());
        compute_tree_stats(db, root, cfg, &mut marks)
    }

    #[test]
    fn walk_scores_exactly_the_measurable_nodes() {
        // ((~~..~K1 == K2) & x) | !(K3 ^ y) with a long static-only arm.
        let (mut db, _, _, root) = single_statement(|b| {
            let mut k1 = b.leaf(ExprOp::Static, 4, 1);
            for _ in 0..300 {
                k1 = b.unary(ExprOp::Inv, k1, 4, 1).unwrap();
            }
            let k2 = b.leaf(ExprOp::Static, 4, 1);
            let eq = b.binary(ExprOp::Eq, k1, k2, 1, 1).unwrap();
            let x = b.leaf(ExprOp::Signal, 1, 1);
            let and = b.binary(ExprOp::And, eq, x, 1, 1).unwrap();
            let k3 = b.leaf(ExprOp::Static, 1, 1);
            let y = b.leaf(ExprOp::Signal, 1, 1);
            let xor = b.binary(ExprOp::Xor, k3, y, 1, 1).unwrap();
            let not = b.unary(ExprOp::Not, xor, 1, 1).unwrap();
            b.binary(ExprOp::Or, and, not, 1, 1).unwrap()
        });
        let mut marks = PassMarks::new(db.exprs.len());
        compute_tree_stats(&mut db, root, &CombConfig::default(), &mut marks);

        let fresh = PassMarks::new(db.exprs.len());
        let mut counted = 0;
        for id in db.subtree(root) {
            assert_eq!(
                marks.is_counted(id),
                crate::classify::is_measurable(&db, id, &fresh),
                "{id}"
            );
            counted += usize::from(marks.is_counted(id));
        }
        // x, and, y, xor, not, or
        assert_eq!(counted, 6);
    }

    #[test]
    fn unary_root_scores_two_points() {
        let (mut db, _, _, root) = single_statement(|b| b.leaf(ExprOp::Signal, 1, 3));
        db.exprs[root].was_true = true;
        let stats = stats_of(&mut db, root, &CombConfig::default());
        assert_eq!((stats.hit, stats.total, stats.excluded), (1, 2, 0));
        assert_eq!(db.exprs[root].underline_id, Some(1));
    }

    #[test]
    fn fully_covered_gets_no_underline() {
        let (mut db, _, _, root) = single_statement(|b| b.leaf(ExprOp::AnyEdge, 1, 3));
        db.exprs[root].was_true = true;
        let stats = stats_of(&mut db, root, &CombConfig::default());
        assert!(stats.is_complete());
        assert!(db.exprs[root].underline_id.is_none());
    }

    #[test]
    fn underlines_follow_post_order() {
        // (a == b) | (c == d), chains irrelevant: | has no same-family child.
        let mut ids = Vec::new();
        let (mut db, _, _, root) = single_statement(|b| {
            let a = b.leaf(ExprOp::Signal, 1, 1);
            let bb = b.leaf(ExprOp::Signal, 1, 1);
            let l = b.binary(ExprOp::Eq, a, bb, 1, 1).unwrap();
            let c = b.leaf(ExprOp::Signal, 1, 1);
            let d = b.leaf(ExprOp::Signal, 1, 1);
            let r = b.binary(ExprOp::Ne, c, d, 1, 1).unwrap();
            ids.extend([l, r]);
            b.binary(ExprOp::Or, l, r, 1, 1).unwrap()
        });
        let stats = stats_of(&mut db, root, &CombConfig::default());
        assert_eq!(stats.total, 4 + 4 + 3);
        assert_eq!(stats.hit, 0);
        assert_eq!(db.exprs[ids[0]].underline_id, Some(1));
        assert_eq!(db.exprs[ids[1]].underline_id, Some(2));
        assert_eq!(db.exprs[root].underline_id, Some(3));
    }

    #[test]
    fn rerun_keeps_existing_ids() {
        let (mut db, _, _, root) = single_statement(|b| {
            let x = b.leaf(ExprOp::Signal, 1, 1);
            let y = b.leaf(ExprOp::Signal, 1, 1);
            b.binary(ExprOp::Lt, x, y, 1, 1).unwrap()
        });
        let cfg = CombConfig::default();
        let first = stats_of(&mut db, root, &cfg);
        db.exprs[root].underline_id = Some(7);
        let second = stats_of(&mut db, root, &cfg);
        assert_eq!(first, second);
        assert_eq!(db.exprs[root].underline_id, Some(7));
    }

    #[test]
    fn depth_budget_skips_deep_nodes() {
        let mut eq_id = None;
        let (mut db, _, _, root) = single_statement(|b| {
            let x = b.leaf(ExprOp::Signal, 1, 1);
            let y = b.leaf(ExprOp::Signal, 1, 1);
            let eq = b.binary(ExprOp::Eq, x, y, 1, 1).unwrap();
            eq_id = Some(eq);
            let z = b.leaf(ExprOp::Signal, 1, 1);
            b.binary(ExprOp::And, eq, z, 1, 1).unwrap()
        });
        let cfg = CombConfig {
            depth_budget: Some(0),
            ..CombConfig::default()
        };
        let stats = stats_of(&mut db, root, &cfg);
        assert_eq!(stats.total, 3);
        assert!(db.exprs[eq_id.unwrap()].underline_id.is_none());
    }

    #[test]
    fn static_only_tree_scores_nothing() {
        let (mut db, _, _, root) = single_statement(|b| {
            let k1 = b.leaf(ExprOp::Static, 1, 1);
            let k2 = b.leaf(ExprOp::Static, 1, 1);
            b.binary(ExprOp::And, k1, k2, 1, 1).unwrap()
        });
        let stats = stats_of(&mut db, root, &CombConfig::default());
        assert_eq!(stats, TreeStats::default());
    }

    #[test]
    fn control_root_scores_operands() {
        // if (x): the condition under an `if` marker is scored on its own.
        let mut x_id = None;
        let (mut db, _, _, root) = single_statement(|b| {
            let x = b.leaf(ExprOp::Signal, 1, 1);
            x_id = Some(x);
            b.unary(ExprOp::If, x, 1, 1).unwrap()
        });
        let stats = stats_of(&mut db, root, &CombConfig::default());
        assert_eq!(stats.total, 2);
        assert!(db.exprs[x_id.unwrap()].underline_id.is_some());
    }

    #[test]
    fn recalc_scope_counts_lines_and_stores() {
        let (mut db, scope, stmt, root) = single_statement(|b| b.leaf(ExprOp::Signal, 1, 5));
        db.exprs[root].was_true = true;
        db.exprs[root].was_false = true;
        db.exprs[root].exec_count = 3;
        let stat = recalc_scope(&mut db, scope, &CombConfig::default()).unwrap();
        assert_eq!(stat.comb_hit, 2);
        assert_eq!(stat.comb_total, 2);
        assert_eq!(stat.line_hit, 1);
        assert_eq!(stat.line_total, 1);
        assert_eq!(db.scopes[scope].stat, stat);

        // The same statement listed twice is counted once.
        db.add_statement_to_scope(scope, stmt);
        let again = recalc_scope(&mut db, scope, &CombConfig::default()).unwrap();
        assert_eq!(again, stat);
    }

    #[test]
    fn recalc_unknown_scope_errors() {
        let mut db = CoverageDb::new();
        let err = recalc_scope(&mut db, ScopeId::from_raw(4), &CombConfig::default()).unwrap_err();
        assert_eq!(err, CombError::ScopeNotFound(ScopeId::from_raw(4)));
    }

    #[test]
    fn hierarchy_sums_children() {
        let mut db = CoverageDb::new();
        let top = db.add_scope(Scope::new("top", ScopeKind::Instance));
        let child = db.add_scope(Scope::new("top.u0", ScopeKind::Instance));
        db.add_child_scope(top, child);
        db.scopes[top].stat.comb_total = 3;
        db.scopes[top].stat.comb_hit = 1;
        db.scopes[child].stat.comb_total = 4;
        db.scopes[child].stat.comb_hit = 4;
        let sum = hierarchy_summary(&db, top).unwrap();
        assert_eq!((sum.comb_hit, sum.comb_total), (5, 7));
        assert!(hierarchy_summary(&db, ScopeId::from_raw(9)).is_err());
    }

    #[test]
    fn reset_clears_ids() {
        let (mut db, _, stmt, root) = single_statement(|b| b.leaf(ExprOp::Signal, 1, 1));
        stats_of(&mut db, root, &CombConfig::default());
        assert!(db.exprs[root].underline_id.is_some());
        reset_underlines(&mut db, stmt);
        assert!(db.exprs[root].underline_id.is_none());
    }

    #[test]
    fn collect_splits_roots_without_mutation() {
        let mut db = CoverageDb::new();
        let scope = db.add_scope(Scope::new("top", ScopeKind::Module));
        let mut b = TreeBuilder::new(&mut db);
        let hit = b.leaf(ExprOp::PosEdge, 1, 1);
        let s1 = b.statement(hit).unwrap();
        let miss = b.leaf(ExprOp::PosEdge, 1, 2);
        let s2 = b.statement(miss).unwrap();
        let k = b.leaf(ExprOp::Static, 1, 3);
        let s3 = b.statement(k).unwrap();
        for s in [s1, s2, s3] {
            db.add_statement_to_scope(scope, s);
        }
        db.exprs[hit].was_true = true;

        let lists = collect_expressions(&db, scope, &CombConfig::default()).unwrap();
        assert_eq!(lists.covered.len(), 1);
        assert_eq!(lists.covered[0].expr, hit);
        assert_eq!(lists.uncovered.len(), 1);
        assert_eq!(lists.uncovered[0].line, 2);
        assert!(db.exprs[miss].underline_id.is_none());
    }
}
