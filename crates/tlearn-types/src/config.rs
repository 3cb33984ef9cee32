//! Shell configuration.
//!
//! Loaded from an optional TOML file, then overridden by `TLEARN_*`
//! environment variables. Every field has a default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TlearnError};

/// Environment variable overriding [`ShellConfig::api_base`].
pub const ENV_API_BASE: &str = "TLEARN_API_BASE";
/// Environment variable overriding [`ShellConfig::credentials_path`].
pub const ENV_CREDENTIALS: &str = "TLEARN_CREDENTIALS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Base URL of the t-learn API (no trailing slash needed).
    pub api_base: String,
    /// Where the login token and username are persisted.
    pub credentials_path: PathBuf,
    /// First line shown when the shell starts.
    pub welcome: String,
    /// Per-request timeout for API calls.
    pub request_timeout_secs: u64,
}

fn default_credentials_path() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".tlearn").join("credentials.toml"),
        None => PathBuf::from(".tlearn-credentials.toml"),
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080".to_string(),
            credentials_path: default_credentials_path(),
            welcome: "Welcome to t-learn v1.0.0. Type 'help' to start.".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ShellConfig {
    /// Parse a config from TOML. Missing fields take their defaults.
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| TlearnError::Config(format!("tlearn.toml: {e}")))
    }

    /// Load a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let source = std::fs::read_to_string(path)?;
        Self::from_toml(&source)
    }

    /// Apply `TLEARN_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in production).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base) = lookup(ENV_API_BASE).filter(|v| !v.is_empty()) {
            self.api_base = base;
        }
        if let Some(path) = lookup(ENV_CREDENTIALS).filter(|v| !v.is_empty()) {
            self.credentials_path = PathBuf::from(path);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_api() {
        let cfg = ShellConfig::default();
        assert_eq!(cfg.api_base, "http://localhost:8080");
        assert_eq!(cfg.request_timeout_secs, 30);
        assert!(cfg.welcome.contains("help"));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = ShellConfig::from_toml("api_base = \"https://learn.example\"").unwrap();
        assert_eq!(cfg.api_base, "https://learn.example");
        assert_eq!(cfg.request_timeout_secs, 30);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = ShellConfig::from_toml("api_base = ").unwrap_err();
        assert!(matches!(err, TlearnError::Config(_)));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ShellConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, ShellConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tlearn.toml");
        std::fs::write(&path, "welcome = \"hi\"\nrequest_timeout_secs = 5\n").unwrap();
        let cfg = ShellConfig::load(&path).unwrap();
        assert_eq!(cfg.welcome, "hi");
        assert_eq!(cfg.request_timeout_secs, 5);
    }

    #[test]
    fn overrides_replace_non_empty_values() {
        let cfg = ShellConfig::default().with_overrides(|key| match key {
            ENV_API_BASE => Some("http://10.0.0.2:9000".to_string()),
            ENV_CREDENTIALS => Some(String::new()),
            _ => None,
        });
        assert_eq!(cfg.api_base, "http://10.0.0.2:9000");
        assert_eq!(cfg.credentials_path, default_credentials_path());
    }
}
