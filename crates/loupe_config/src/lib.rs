//! Parsing and validation of `loupe.toml` coverage configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`LoupeConfig`]; [`LoupeConfig::comb`] narrows it to the [`CombConfig`]
//! the combinational engine consumes.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
