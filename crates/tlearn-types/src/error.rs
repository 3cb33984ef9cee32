//! Error types for t-learn.

use std::io;

/// Errors produced by the t-learn shell and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum TlearnError {
    #[error("command error: {0}")]
    Command(String),

    /// A remote API failure. The message is shown to the user verbatim.
    #[error("{0}")]
    Api(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("credential store error: {0}")]
    Credential(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TlearnError>;
