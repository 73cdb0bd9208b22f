//! Configuration types deserialized from `loupe.toml`.

use serde::Deserialize;

/// The top-level configuration parsed from `loupe.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoupeConfig {
    /// Combinational coverage settings.
    #[serde(default)]
    pub combinational: CombinationalSection,
    /// Accounting settings shared by all coverage kinds.
    #[serde(default)]
    pub scoring: ScoringSection,
}

/// The `[combinational]` table.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CombinationalSection {
    /// Score runs of same-family and/or gates as a single chain.
    #[serde(default = "default_true")]
    pub multi_expr: bool,
    /// Score each bit of wide expressions separately.
    #[serde(default)]
    pub bitwise: bool,
    /// Deepest expression level scored; absent means unlimited.
    #[serde(default)]
    pub depth: Option<u32>,
}

impl Default for CombinationalSection {
    fn default() -> Self {
        Self {
            multi_expr: true,
            bitwise: false,
            depth: None,
        }
    }
}

/// The `[scoring]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringSection {
    /// Keep separate statistics per instantiation instead of per definition.
    #[serde(default)]
    pub per_instance: bool,
}

fn default_true() -> bool {
    true
}

/// Settings the combinational engine depends on.
///
/// Compared between passes: underline ids produced under one configuration
/// are discarded when scoring under another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombConfig {
    /// Score and/or chains holistically.
    pub allow_multi_expr: bool,
    /// Score wide expressions bit by bit.
    pub bitwise: bool,
    /// Depth budget; `None` scores every level.
    pub depth_budget: Option<u32>,
}

impl Default for CombConfig {
    fn default() -> Self {
        Self {
            allow_multi_expr: true,
            bitwise: false,
            depth_budget: None,
        }
    }
}

impl LoupeConfig {
    /// Returns the combinational engine settings.
    pub fn comb(&self) -> CombConfig {
        CombConfig {
            allow_multi_expr: self.combinational.multi_expr,
            bitwise: self.combinational.bitwise,
            depth_budget: self.combinational.depth,
        }
    }
}
