//! `loupe exclude`: toggle an exclusion and save the snapshot.

use loupe_comb::{scope_by_name, CombEngine, ExclusionOutcome};
use loupe_ir::{CoverageDb, ExprId};

use crate::{ExcludeArgs, GlobalArgs};

/// Parses an expression id written as `12` or `e12`.
pub fn parse_expr_id(s: &str) -> Result<u32, String> {
    let digits = s.strip_prefix('e').unwrap_or(s);
    digits
        .parse()
        .map_err(|_| format!("'{s}' is not an expression id (expected e.g. e12)"))
}

/// Runs the `loupe exclude` command.
///
/// The snapshot is rescored first so cached statistics and underline ids
/// are current, then the toggle is applied and the file rewritten.
pub fn run(args: &ExcludeArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = global.load_config()?;
    let mut db = CoverageDb::load(&args.snapshot)?;
    let outcome = apply(&mut db, CombEngine::new(config.comb()), args)?;
    db.save(&args.snapshot)?;

    if !global.quiet {
        let s = &db.scopes[outcome.scopes[0]].stat;
        println!(
            "{} e{}: comb_hit {:+}, comb_excluded {:+}, line_hit {:+} in {} scope(s); comb now {}/{}",
            if args.include { "included" } else { "excluded" },
            args.expr,
            outcome.comb_hit_delta,
            outcome.comb_excluded_delta,
            outcome.line_hit_delta,
            outcome.scopes.len(),
            s.comb_hit,
            s.comb_total
        );
        if outcome.shadowed {
            eprintln!("warning: an enclosing expression is already excluded");
        }
    }
    Ok(0)
}

fn apply(
    db: &mut CoverageDb,
    mut engine: CombEngine,
    args: &ExcludeArgs,
) -> Result<ExclusionOutcome, loupe_comb::CombError> {
    engine.score_all(db);
    let scope = scope_by_name(db, &args.scope)?;
    let expr = ExprId::from_raw(args.expr);
    let excluded = !args.include;
    match args.underline {
        Some(ulid) => engine.set_exclusion_by_underline(db, scope, expr, ulid, excluded),
        None => engine.set_exclusion(db, scope, expr, excluded, args.line),
    }
}
