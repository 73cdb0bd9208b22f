//! Errors raised while reading `loupe.toml`.

/// Why a coverage configuration could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read loupe.toml: {0}")]
    IoError(#[from] std::io::Error),

    /// The file is not valid TOML or contains unknown keys.
    #[error("malformed loupe.toml: {0}")]
    ParseError(String),

    /// A setting parsed but is out of range.
    #[error("invalid coverage setting: {0}")]
    ValidationError(String),
}
