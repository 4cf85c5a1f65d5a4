//! Key/value persistence backing the session and theme stores.
//!
//! [`FileStorage`] keeps every key in one JSON object on disk, which plays the
//! role of a browser storage scope: one state directory per "tab".

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::Result;

/// Plain string key/value storage. No schema versioning.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local storage, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Storage persisted as a JSON object in `<dir>/state.json`.
///
/// Nothing is cached: every read goes to the file, so a session written or
/// cleared by another process is seen on the next request.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Open the state file inside `dir`; it is created on the first write.
    pub fn open(dir: &Path) -> Result<Self> {
        let storage = Self {
            path: dir.join("state.json"),
            write_lock: Mutex::new(()),
        };
        let entries = storage.read()?;
        debug!(path = %storage.path.display(), keys = entries.len(), "state opened");
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            Ok(_) => Ok(BTreeMap::new()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        match self.read() {
            Ok(entries) => entries.get(key).cloned(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "state unreadable");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut entries = self.read()?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut entries = self.read()?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("theme"), None);
        storage.set("theme", "dark").unwrap();
        assert_eq!(storage.get("theme").as_deref(), Some("dark"));
        storage.remove("theme").unwrap();
        assert_eq!(storage.get("theme"), None);
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = FileStorage::open(dir.path()).unwrap();
            storage.set("theme", "light").unwrap();
            storage.set("other", "x").unwrap();
            storage.remove("other").unwrap();
        }
        let reopened = FileStorage::open(dir.path()).unwrap();
        assert_eq!(reopened.get("theme").as_deref(), Some("light"));
        assert_eq!(reopened.get("other"), None);
    }

    #[test]
    fn test_file_storage_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = FileStorage::open(&nested).unwrap();
        storage.set("k", "v").unwrap();
        assert!(storage.path().exists());
    }

    #[test]
    fn test_file_storage_reads_through_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let first = FileStorage::open(dir.path()).unwrap();
        let second = FileStorage::open(dir.path()).unwrap();

        first.set("custody-session", "{}").unwrap();
        assert_eq!(second.get("custody-session").as_deref(), Some("{}"));

        second.remove("custody-session").unwrap();
        assert_eq!(first.get("custody-session"), None);
    }
}
