//! A configured front door to the combinational engine.
//!
//! [`CombEngine`] carries the [`CombConfig`] every operation needs and
//! remembers which configuration produced the underline ids currently in
//! the database, so that a change (e.g. turning chains off) starts from a
//! cleared state instead of mixing ids from two numbering schemes.

use crate::detail::{missing_detail, statement_detail, DetailRow};
use crate::error::CombError;
use crate::exclude::{set_exclusion, set_exclusion_by_underline, ExclusionOutcome};
use crate::stats::{recalc_scope, reset_underlines};
use loupe_config::CombConfig;
use loupe_ir::{CoverageDb, ExprId, ScopeId, Statistic, StmtId};

/// Combinational coverage engine bound to one configuration.
#[derive(Debug, Clone)]
pub struct CombEngine {
    config: CombConfig,
    scored_with: Option<CombConfig>,
}

impl CombEngine {
    /// Creates an engine. Underline ids already in a database are trusted
    /// until the first scoring pass under a different configuration.
    pub fn new(config: CombConfig) -> Self {
        Self {
            config,
            scored_with: None,
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &CombConfig {
        &self.config
    }

    /// Replaces the configuration; takes effect at the next [`score_all`](Self::score_all).
    pub fn set_config(&mut self, config: CombConfig) {
        self.config = config;
    }

    /// Recomputes every scope's statistic.
    ///
    /// If the previous pass ran under a different configuration, every
    /// underline id is cleared first.
    pub fn score_all(&mut self, db: &mut CoverageDb) -> Vec<(ScopeId, Statistic)> {
        if self.scored_with.is_some_and(|prev| prev != self.config) {
            log::debug!("configuration changed since last pass; resetting underline ids");
            let stmts: Vec<StmtId> = db.stmts.ids().collect();
            for stmt in stmts {
                reset_underlines(db, stmt);
            }
        }
        let scopes: Vec<ScopeId> = db.scopes.ids().collect();
        let mut out = Vec::with_capacity(scopes.len());
        for scope in scopes {
            match recalc_scope(db, scope, &self.config) {
                Ok(stat) => out.push((scope, stat)),
                Err(e) => unreachable!("scope ids come from the arena: {e}"),
            }
        }
        self.scored_with = Some(self.config);
        out
    }

    /// Recomputes one scope's statistic.
    pub fn recalc_scope(
        &mut self,
        db: &mut CoverageDb,
        scope: ScopeId,
    ) -> Result<Statistic, CombError> {
        recalc_scope(db, scope, &self.config)
    }

    /// See [`set_exclusion`].
    pub fn set_exclusion(
        &self,
        db: &mut CoverageDb,
        scope: ScopeId,
        expr: ExprId,
        excluded: bool,
        also_set_line: bool,
    ) -> Result<ExclusionOutcome, CombError> {
        set_exclusion(db, &self.config, scope, expr, excluded, also_set_line)
    }

    /// See [`set_exclusion_by_underline`].
    pub fn set_exclusion_by_underline(
        &self,
        db: &mut CoverageDb,
        scope: ScopeId,
        expr: ExprId,
        ulid: u32,
        excluded: bool,
    ) -> Result<ExclusionOutcome, CombError> {
        set_exclusion_by_underline(db, &self.config, scope, expr, ulid, excluded)
    }

    /// See [`missing_detail`].
    pub fn missing_detail(&self, db: &CoverageDb, expr: ExprId) -> Vec<DetailRow> {
        missing_detail(db, expr, &self.config)
    }

    /// See [`statement_detail`].
    pub fn statement_detail(&self, db: &CoverageDb, stmt: StmtId) -> Vec<DetailRow> {
        statement_detail(db, stmt, &self.config)
    }
}

/// Resolves a scope by name.
pub fn scope_by_name(db: &CoverageDb, name: &str) -> Result<ScopeId, CombError> {
    db.find_scope(name)
        .ok_or_else(|| CombError::ScopeNameNotFound(name.to_string()))
}
