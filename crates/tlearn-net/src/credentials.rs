//! Persisted login credentials.
//!
//! A flat TOML table of string keys, rewritten on every change.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tlearn_terminal::CredentialStore;
use tlearn_types::error::{Result, TlearnError};

/// Credential store backed by a TOML file.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

/// Parse a credentials file into its key/value table.
pub fn parse_credentials(toml_str: &str) -> Result<BTreeMap<String, String>> {
    toml::from_str(toml_str).map_err(|e| TlearnError::Credential(format!("credentials.toml: {e}")))
}

impl FileCredentialStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            parse_credentials(&std::fs::read_to_string(&path)?)?
        } else {
            BTreeMap::new()
        };
        log::debug!("credential store at {} ({} keys)", path.display(), values.len());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string(&self.values)?;
        let mut file = open_private(&self.path)?;
        // The creation mode only applies to new files.
        restrict_permissions(&self.path)?;
        file.write_all(contents.as_bytes())?;
        Ok(())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).create(true).truncate(true).open(path)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}
