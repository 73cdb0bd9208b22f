//! `loupe report`: score a snapshot and print per-scope coverage.

use std::fmt::Write as _;

use loupe_comb::{collect_expressions, scope_by_name, CombEngine, CombError};
use loupe_ir::{CoverageDb, ScopeId, ScopeKind};

use crate::{GlobalArgs, ReportArgs};

/// Runs the `loupe report` command. Returns exit code 0.
pub fn run(args: &ReportArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = global.load_config()?;
    let mut db = CoverageDb::load(&args.snapshot)?;
    let mut engine = CombEngine::new(config.comb());
    engine.score_all(&mut db);
    log::info!(
        "scored {} scope(s) from {}",
        db.scopes.len(),
        args.snapshot.display()
    );

    let scopes = match &args.scope {
        Some(name) => vec![scope_by_name(&db, name)?],
        None => reported_scopes(&db, config.scoring.per_instance),
    };
    let text = render(&db, &engine, &scopes, args.detail)?;
    if !global.quiet {
        print!("{text}");
    }
    Ok(0)
}

/// Instance scopes under per-instance accounting, definitions otherwise.
fn reported_scopes(db: &CoverageDb, per_instance: bool) -> Vec<ScopeId> {
    db.scopes
        .iter()
        .filter(|(_, s)| (s.kind == ScopeKind::Instance) == per_instance)
        .map(|(id, _)| id)
        .collect()
}

fn render(
    db: &CoverageDb,
    engine: &CombEngine,
    scopes: &[ScopeId],
    detail: bool,
) -> Result<String, CombError> {
    let mut out = String::new();
    for &id in scopes {
        let scope = &db.scopes[id];
        let s = &scope.stat;
        let _ = writeln!(
            out,
            "{} ({:?}): comb {}/{} ({:.1}%, {} missing, {} excluded), line {}/{} ({:.1}%)",
            scope.name,
            scope.kind,
            s.comb_hit,
            s.comb_total,
            s.percent_comb(),
            s.comb_missed(),
            s.comb_excluded,
            s.line_hit,
            s.line_total,
            s.percent_line()
        );
        if !detail {
            continue;
        }
        let lists = collect_expressions(db, id, engine.config())?;
        for summary in &lists.uncovered {
            let _ = writeln!(
                out,
                "  line {} {}: {}/{}",
                summary.line, summary.expr, summary.stats.hit, summary.stats.total
            );
            let Some(stmt) = db.statement_of(summary.expr) else {
                continue;
            };
            for row in engine.statement_detail(db, stmt) {
                let label = match row.underline_id {
                    Some(ulid) => format!("[{ulid}]"),
                    None => "[-]".to_string(),
                };
                let _ = writeln!(out, "    {label} {}: {}", row.at, row.describe());
            }
        }
    }
    Ok(out)
}

/// A snapshot with a definition scope holding `x & y` and `posedge clk`,
/// plus an instance of it.
#[cfg(test)]
pub(crate) fn sample_db() -> CoverageDb {
    use loupe_ir::{ExprOp, Scope, TreeBuilder};

    let mut db = CoverageDb::new();
    let top = db.add_scope(Scope::new("top", ScopeKind::Module));
    let inst = db.add_scope(Scope::new("tb.dut", ScopeKind::Instance));
    let mut b = TreeBuilder::new(&mut db);
    let x = b.leaf(ExprOp::Signal, 1, 4);
    let y = b.leaf(ExprOp::Signal, 1, 4);
    let and = b.binary(ExprOp::And, x, y, 1, 4).unwrap();
    let s1 = b.statement(and).unwrap();
    let clk = b.leaf(ExprOp::Signal, 1, 6);
    let edge = b.unary(ExprOp::PosEdge, clk, 1, 6).unwrap();
    let s2 = b.statement(edge).unwrap();
    for scope in [top, inst] {
        db.add_statement_to_scope(scope, s1);
        db.add_statement_to_scope(scope, s2);
    }
    db.exprs[x].was_false = true;
    db.exprs[and].eval11 = true;
    db.exprs[edge].was_true = true;
    db.exprs[edge].exec_count = 4;
    db
}
