//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::LoupeConfig;
use std::path::Path;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "loupe.toml";

/// Deepest depth budget accepted; deeper trees are scored with no budget.
const MAX_DEPTH: u32 = 1024;

/// Loads and validates a configuration file.
///
/// If `path` is a directory, `<path>/loupe.toml` is read.
pub fn load_config(path: &Path) -> Result<LoupeConfig, ConfigError> {
    let config_path = if path.is_dir() {
        path.join(CONFIG_FILE_NAME)
    } else {
        path.to_path_buf()
    };
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `loupe.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<LoupeConfig, ConfigError> {
    let config: LoupeConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &LoupeConfig) -> Result<(), ConfigError> {
    if let Some(depth) = config.combinational.depth {
        if depth > MAX_DEPTH {
            return Err(ConfigError::ValidationError(format!(
                "combinational.depth {depth} exceeds the maximum of {MAX_DEPTH}; omit it to score every level"
            )));
        }
    }
    Ok(())
}
