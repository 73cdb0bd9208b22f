//! Exclusion toggling with incremental repair of cached statistics.
//!
//! Toggling one node only changes the tree of the statement containing it,
//! so instead of rescanning the scope the engine rescores that one tree
//! before and after the toggle and shifts every affected scope's cached
//! counters by the difference.

use crate::error::CombError;
use crate::marks::PassMarks;
use crate::stats::{compute_tree_stats, has_line};
use loupe_config::CombConfig;
use loupe_ir::{CoverageDb, ExprId, ScopeId, StmtId};

/// What an exclusion request changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionOutcome {
    /// Statement whose tree was rescored.
    pub stmt: StmtId,
    /// Change applied to `comb_hit`.
    pub comb_hit_delta: i64,
    /// Change applied to `comb_excluded`.
    pub comb_excluded_delta: i64,
    /// Change applied to `line_hit` (and `line_excluded`).
    pub line_hit_delta: i64,
    /// An ancestor of the node is excluded, so the toggle had no visible effect.
    pub shadowed: bool,
    /// Every scope whose cached statistic was shifted.
    pub scopes: Vec<ScopeId>,
}

fn shift(counter: &mut u32, delta: i64, name: &str, scope: ScopeId) {
    let next = i64::from(*counter) + delta;
    assert!(
        (0..=i64::from(u32::MAX)).contains(&next),
        "{name} of {scope} out of range after exclusion; cached statistic was stale"
    );
    *counter = next as u32;
}

/// Locates the statement containing `expr` and checks that `scope` lists it.
fn locate(db: &CoverageDb, scope: ScopeId, expr: ExprId) -> Result<StmtId, CombError> {
    let s = db.scopes.try_get(scope).ok_or(CombError::ScopeNotFound(scope))?;
    if !db.exprs.contains(expr) {
        return Err(CombError::ExprNotFound(expr));
    }
    db.statement_of(expr)
        .filter(|stmt| s.statements.contains(stmt))
        .ok_or(CombError::ExprNotInScope { expr, scope })
}

/// Sets the exclusion flag of `expr` and repairs cached statistics.
///
/// The statement containing `expr` is rescored with fresh pass marks before
/// and after the flag changes; the `comb_hit` and `comb_excluded`
/// differences are applied to every scope listing that statement (instances
/// sharing one definition all see the change). With `also_set_line`, an
/// excluded statement root on a real, never-executed line also moves the
/// statement's line into `line_hit`; control roots and synthetic lines are
/// never touched.
///
/// Setting the value a node already has changes nothing.
pub fn set_exclusion(
    db: &mut CoverageDb,
    cfg: &CombConfig,
    scope: ScopeId,
    expr: ExprId,
    excluded: bool,
    also_set_line: bool,
) -> Result<ExclusionOutcome, CombError> {
    let stmt = locate(db, scope, expr)?;
    let root = db.stmts[stmt].root;
    let shadowed = db.ancestors(expr).any(|a| db.exprs[a].excluded);

    let mut marks = PassMarks::new(db.exprs.len());
    let before = compute_tree_stats(db, root, cfg, &mut marks);
    db.exprs[expr].excluded = excluded;
    marks.begin_pass();
    let after = compute_tree_stats(db, root, cfg, &mut marks);
    debug_assert_eq!(before.total, after.total, "exclusion changed the point count");

    let comb_hit_delta = i64::from(after.hit) - i64::from(before.hit);
    let comb_excluded_delta = i64::from(after.excluded) - i64::from(before.excluded);

    let mut line_hit_delta = 0;
    if expr == root
        && also_set_line
        && has_line(db, stmt)
        && db.exprs[root].exec_count == 0
        && db.stmts[stmt].line_excluded != excluded
    {
        db.stmts[stmt].line_excluded = excluded;
        line_hit_delta = if excluded { 1 } else { -1 };
    }

    let scopes = db.scopes_listing(stmt);
    for &id in &scopes {
        let stat = &mut db.scopes[id].stat;
        shift(&mut stat.comb_hit, comb_hit_delta, "comb_hit", id);
        shift(&mut stat.comb_excluded, comb_excluded_delta, "comb_excluded", id);
        shift(&mut stat.line_hit, line_hit_delta, "line_hit", id);
        shift(&mut stat.line_excluded, line_hit_delta, "line_excluded", id);
    }

    log::debug!(
        "{} {expr} in {stmt}: comb_hit {comb_hit_delta:+}, comb_excluded {comb_excluded_delta:+}, line_hit {line_hit_delta:+} across {} scope(s){}",
        if excluded { "excluded" } else { "included" },
        scopes.len(),
        if shadowed { " (shadowed by excluded ancestor)" } else { "" }
    );

    Ok(ExclusionOutcome {
        stmt,
        comb_hit_delta,
        comb_excluded_delta,
        line_hit_delta,
        shadowed,
        scopes,
    })
}

/// Finds the node under `expr` (inclusive) carrying underline id `ulid`.
pub fn find_by_underline(db: &CoverageDb, expr: ExprId, ulid: u32) -> Result<ExprId, CombError> {
    if !db.exprs.contains(expr) {
        return Err(CombError::ExprNotFound(expr));
    }
    db.subtree(expr)
        .into_iter()
        .find(|&id| db.exprs[id].underline_id == Some(ulid))
        .ok_or(CombError::UnderlineNotFound {
            expr,
            underline: ulid,
        })
}

/// Excludes or includes the sub-point of `expr` the renderer labelled `ulid`.
///
/// Line coverage is never affected through this path.
pub fn set_exclusion_by_underline(
    db: &mut CoverageDb,
    cfg: &CombConfig,
    scope: ScopeId,
    expr: ExprId,
    ulid: u32,
    excluded: bool,
) -> Result<ExclusionOutcome, CombError> {
    locate(db, scope, expr)?;
    let target = find_by_underline(db, expr, ulid)?;
    set_exclusion(db, cfg, scope, target, excluded, false)
}
