//! JSON file-based config store.
//!
//! The configuration is written with atomic file writes (write-to-temp +
//! rename) so a crash never leaves a half-written file behind. A file that
//! exists but does not parse is treated as absent and removed, so the user is
//! simply asked to log in again.

use crate::domain::error::{DeskError, Result};
use crate::domain::LoginConfig;
use crate::storage::backend::ConfigStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const FORMAT_VERSION: u32 = 1;

/// On-disk envelope.
///
/// ```json
/// {
///   "version": 1,
///   "config": {
///     "baseUrl": "http://zentao.local",
///     "account": "admin",
///     "password": "123456"
///   }
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
struct ConfigFile {
    version: u32,
    config: LoginConfig,
}

/// JSON file config store.
///
/// Reads go to disk every time; the file is small and written rarely.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    file_path: PathBuf,
}

impl JsonConfigStore {
    /// Opens a store at `file_path`, creating parent directories.
    ///
    /// The file itself is created on the first save.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use zentao_desk::storage::JsonConfigStore;
    /// use std::path::PathBuf;
    ///
    /// let store = JsonConfigStore::new(PathBuf::from("/tmp/zentao-desk/config.json"))?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "initializing JSON config store");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Ok(Self { file_path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn discard_corrupt(&self, reason: &str) {
        tracing::warn!(path = ?self.file_path, reason = reason, "discarding unreadable config file");
        if let Err(e) = std::fs::remove_file(&self.file_path) {
            tracing::warn!(error = %e, "failed to remove unreadable config file");
        }
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> Result<Option<LoginConfig>> {
        let _span = tracing::debug_span!("json_config_load", path = ?self.file_path).entered();

        let contents = match std::fs::read_to_string(&self.file_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no saved config");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<ConfigFile>(&contents) {
            Ok(file) if file.version == FORMAT_VERSION => {
                tracing::debug!(account = %file.config.account, "loaded saved config");
                Ok(Some(file.config))
            }
            Ok(file) => {
                self.discard_corrupt(&format!("unsupported version {}", file.version));
                Ok(None)
            }
            Err(e) => {
                self.discard_corrupt(&e.to_string());
                Ok(None)
            }
        }
    }

    fn save(&mut self, config: &LoginConfig) -> Result<()> {
        let _span = tracing::debug_span!("json_config_save", path = ?self.file_path).entered();

        let file = ConfigFile {
            version: FORMAT_VERSION,
            config: config.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| DeskError::Storage(format!("failed to serialize config: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");
        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;

        tracing::debug!("config saved");
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        match std::fs::remove_file(&self.file_path) {
            Ok(()) => {
                tracing::debug!(path = ?self.file_path, "config cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LoginConfig {
        LoginConfig::new("http://zentao.local", "admin", "123456")
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonConfigStore::new(dir.path().join("config.json")).unwrap();

        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_then_load_returns_same_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonConfigStore::new(dir.path().join("nested/config.json")).unwrap();

        store.save(&sample()).unwrap();

        assert_eq!(store.load().unwrap(), Some(sample()));
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[test]
    fn corrupt_file_is_removed_and_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonConfigStore::new(path.clone()).unwrap();

        assert_eq!(store.load().unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonConfigStore::new(dir.path().join("config.json")).unwrap();
        store.save(&sample()).unwrap();

        store.clear().unwrap();
        store.clear().unwrap();

        assert_eq!(store.load().unwrap(), None);
    }
}
