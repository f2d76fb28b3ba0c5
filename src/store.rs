use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;

pub const CLIENTS_FILE: &str = "clients.json";
pub const INVOICES_FILE: &str = "invoices.json";
pub const CONFIG_FILE: &str = "config.json";

/// Whole-collection JSON persistence. Callers always load, mutate in memory,
/// and save the entire collection back; there is no querying or locking.
pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: PathBuf) -> Self {
        Store { root }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Loads a collection. A missing file yields the default value; an
    /// unreadable or corrupt file is an error so the caller can warn instead
    /// of silently discarding data.
    pub fn load<T>(&self, name: &str) -> Result<T, StorageError>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.path(name);
        if !path.exists() {
            return Ok(T::default());
        }
        let content = fs::read_to_string(&path).map_err(|source| StorageError::Io {
            name: name.to_string(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
            name: name.to_string(),
            source,
        })
    }

    /// Saves a collection by writing a sibling temp file and renaming it over
    /// the target, so a crash mid-write never leaves a torn file.
    pub fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StorageError> {
        let content =
            serde_json::to_string_pretty(value).map_err(|source| StorageError::Encode {
                name: name.to_string(),
                source,
            })?;
        let path = self.path(name);
        let tmp = self.path(&format!("{name}.tmp"));
        let io_err = |source| StorageError::Io {
            name: name.to_string(),
            source,
        };
        fs::write(&tmp, content).map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)
    }
}
