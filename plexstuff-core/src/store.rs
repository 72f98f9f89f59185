//! Service configuration store.
//!
//! Every plexstuff tool keeps its settings as one opaque JSON blob per
//! service name (`"jackett"`, `"plexlogin"`, ...). The store is a plain
//! key-value map with no migrations or versioning.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::{PlexstuffError, Result};

/// Key-value access to per-service JSON settings.
pub trait ServiceStore: Send + Sync + std::fmt::Debug {
    /// Returns the blob stored for `service`, if any.
    ///
    /// # Errors
    /// - `PlexstuffError::Store` - Backing storage could not be read
    fn get(&self, service: &str) -> Result<Option<Value>>;

    /// Stores `value` for `service`, replacing any previous blob.
    ///
    /// # Errors
    /// - `PlexstuffError::Store` - Backing storage could not be written
    fn set(&self, service: &str, value: Value) -> Result<()>;

    /// Removes `service`, returning whether it was present.
    ///
    /// # Errors
    /// - `PlexstuffError::Store` - Backing storage could not be written
    fn remove(&self, service: &str) -> Result<bool>;

    /// Lists stored service names in ascending order.
    ///
    /// # Errors
    /// - `PlexstuffError::Store` - Backing storage could not be read
    fn services(&self) -> Result<Vec<String>>;
}

/// In-memory store, used by tests and one-shot tools.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ServiceStore for MemoryStore {
    fn get(&self, service: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().get(service).cloned())
    }

    fn set(&self, service: &str, value: Value) -> Result<()> {
        self.entries.write().insert(service.to_string(), value);
        Ok(())
    }

    fn remove(&self, service: &str) -> Result<bool> {
        Ok(self.entries.write().remove(service).is_some())
    }

    fn services(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}

/// Store persisted as a single JSON object on disk.
///
/// The file is re-read on every access so separate processes see each
/// other's writes. A missing file reads as an empty store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens the store at `path` without touching the file system.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, Value>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(PlexstuffError::Store {
                    reason: format!("cannot read {}: {e}", self.path.display()),
                });
            }
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| PlexstuffError::Store {
            reason: format!("{} is not a JSON object: {e}", self.path.display()),
        })
    }

    fn persist(&self, entries: &BTreeMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let serialized = serde_json::to_string_pretty(entries)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, serialized)?;
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!(
            path = %self.path.display(),
            services = entries.len(),
            "Persisted service store"
        );
        Ok(())
    }
}

impl ServiceStore for JsonFileStore {
    fn get(&self, service: &str) -> Result<Option<Value>> {
        Ok(self.load()?.remove(service))
    }

    fn set(&self, service: &str, value: Value) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut entries = self.load()?;
        entries.insert(service.to_string(), value);
        self.persist(&entries)
    }

    fn remove(&self, service: &str) -> Result<bool> {
        let _guard = self.write_lock.lock();
        let mut entries = self.load()?;
        let removed = entries.remove(service).is_some();
        if removed {
            self.persist(&entries)?;
        }
        Ok(removed)
    }

    fn services(&self) -> Result<Vec<String>> {
        Ok(self.load()?.into_keys().collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.get("jackett").unwrap().is_none());

        store.set("jackett", json!({"url": "http://localhost:9117"})).unwrap();
        store.set("plexlogin", json!({"username": "me"})).unwrap();

        assert_eq!(
            store.get("jackett").unwrap(),
            Some(json!({"url": "http://localhost:9117"}))
        );
        assert_eq!(store.services().unwrap(), vec!["jackett", "plexlogin"]);

        assert!(store.remove("jackett").unwrap());
        assert!(!store.remove("jackett").unwrap());
        assert!(store.get("jackett").unwrap().is_none());
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("nothing.json"));

        assert!(store.get("jackett").unwrap().is_none());
        assert!(store.services().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("services.json");

        let store = JsonFileStore::open(&path);
        store.set("jackett", json!({"url": "http://j", "apikey": "k"})).unwrap();
        store.set("jackett", json!({"url": "http://j2", "apikey": "k2"})).unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path);
        assert_eq!(
            reopened.get("jackett").unwrap(),
            Some(json!({"url": "http://j2", "apikey": "k2"}))
        );
        assert_eq!(reopened.services().unwrap(), vec!["jackett"]);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("services.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert!(matches!(
            store.get("jackett"),
            Err(PlexstuffError::Store { .. })
        ));
    }
}
