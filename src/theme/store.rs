//! Persisted key-value preferences
//!
//! A flat JSON object on disk. Writes go to a sibling temp file first and are
//! renamed into place so a crash never leaves a truncated file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};

/// Errors reading or writing preferences
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// Filesystem access failed
    #[error("preference file {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not a JSON object of strings
    #[error("preference file {path} is corrupt: {source}")]
    Corrupt {
        /// File involved
        path: PathBuf,
        /// Parse error
        #[source]
        source: serde_json::Error,
    },

    /// A stored value is not valid for its key
    #[error("invalid value {value:?} for preference `{key}`")]
    InvalidValue {
        /// Preference key
        key: String,
        /// Value found
        value: String,
    },
}

/// JSON-backed string preferences
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl PreferenceStore {
    /// Default location under the user config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("prism-folio").join("preferences.json"))
    }

    /// Store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: BTreeMap::new(),
        }
    }

    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferenceError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).map_err(|source| PreferenceError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preference file at {}", path.display());
                BTreeMap::new()
            }
            Err(source) => return Err(PreferenceError::Io { path, source }),
        };

        Ok(Self {
            path: Some(path),
            values,
        })
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Store `value` under `key` and flush
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), PreferenceError> {
        trace!("Preference {} = {}", key, value);
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    /// Remove `key` and flush
    pub fn remove(&mut self, key: &str) -> Result<Option<String>, PreferenceError> {
        let old = self.values.remove(key);
        if old.is_some() {
            self.flush()?;
        }
        Ok(old)
    }

    fn flush(&self) -> Result<(), PreferenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_err = |source| PreferenceError::Io {
            path: path.clone(),
            source,
        };

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(&self.values).map_err(|source| PreferenceError::Corrupt {
            path: path.clone(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(dir.path().join("prefs.json")).unwrap();
        assert_eq!(store.get("theme"), None);
    }

    #[test]
    fn test_set_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let mut store = PreferenceStore::open(&path).unwrap();
        store.set("theme", "dark").unwrap();

        let reopened = PreferenceStore::open(&path).unwrap();
        assert_eq!(reopened.get("theme"), Some("dark"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            PreferenceStore::open(&path),
            Err(PreferenceError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_remove() {
        let mut store = PreferenceStore::in_memory();
        store.set("theme", "light").unwrap();
        assert_eq!(store.remove("theme").unwrap(), Some("light".to_string()));
        assert_eq!(store.remove("theme").unwrap(), None);
    }
}
