//! Scopes and their cached coverage statistics.

use crate::ids::{ScopeId, StmtId};
use serde::{Deserialize, Serialize};

/// What kind of design unit a scope represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    /// A module definition.
    Module,
    /// A task definition.
    Task,
    /// A function definition.
    Function,
    /// A specific instantiation, when per-instance accounting is enabled.
    Instance,
}

/// Cached coverage counters for one scope.
///
/// This is a derived cache: it must always equal what a fresh recalculation
/// over the scope's statements would produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistic {
    /// Combinational points hit (excluded points read as hit).
    pub comb_hit: u32,
    /// Combinational points in total.
    pub comb_total: u32,
    /// Combinational points counted as hit only because they are excluded.
    pub comb_excluded: u32,
    /// Lines executed or excluded.
    pub line_hit: u32,
    /// Measurable lines.
    pub line_total: u32,
    /// Lines excluded without having been executed.
    pub line_excluded: u32,
}

impl Statistic {
    /// Adds every counter of `other` into `self`.
    pub fn accumulate(&mut self, other: &Statistic) {
        self.comb_hit += other.comb_hit;
        self.comb_total += other.comb_total;
        self.comb_excluded += other.comb_excluded;
        self.line_hit += other.line_hit;
        self.line_total += other.line_total;
        self.line_excluded += other.line_excluded;
    }

    /// Combinational coverage in percent; an empty scope reads as 100%.
    pub fn percent_comb(&self) -> f64 {
        percent(self.comb_hit, self.comb_total)
    }

    /// Line coverage in percent; an empty scope reads as 100%.
    pub fn percent_line(&self) -> f64 {
        percent(self.line_hit, self.line_total)
    }

    /// Number of combinational points still missing.
    pub fn comb_missed(&self) -> u32 {
        self.comb_total - self.comb_hit
    }
}

fn percent(hit: u32, total: u32) -> f64 {
    if total == 0 {
        100.0
    } else {
        f64::from(hit) * 100.0 / f64::from(total)
    }
}

/// A module, task, function, or instance owning statements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    /// Hierarchical or definition name.
    pub name: String,
    /// The design-unit kind.
    pub kind: ScopeKind,
    /// Statements in source order. A statement may be listed by several
    /// instance scopes that share one definition.
    pub statements: Vec<StmtId>,
    /// Child scopes in the instance tree.
    #[serde(default)]
    pub children: Vec<ScopeId>,
    /// Cached coverage counters.
    #[serde(default)]
    pub stat: Statistic,
}

impl Scope {
    /// Creates an empty scope.
    pub fn new(name: impl Into<String>, kind: ScopeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            statements: Vec::new(),
            children: Vec::new(),
            stat: Statistic::default(),
        }
    }
}
