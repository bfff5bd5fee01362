//! Key-value storage for drafts
//!
//! The local-storage analogue: string keys mapped to string values, with
//! synchronous `get`/`set`. `FileStorage` keeps every key in one JSON file;
//! `MemoryStorage` lives for the process only.

use crate::error::{DraftError, Result};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Storage operations used by draft persistence, enabling mocking in tests
#[cfg_attr(test, mockall::automock)]
pub trait DraftStorage: Send + Sync {
    /// Stored value for `key`, or `None` if nothing was ever written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value for `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-local storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| DraftError::StorageRead("memory storage lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| DraftError::StorageWrite {
            key: key.to_string(),
            message: "memory storage lock poisoned".to_string(),
        })?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage backed by a single JSON object file
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|e| DraftError::StorageRead(format!("{}: {e}", self.path.display())))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content)
            .map_err(|e| DraftError::StorageRead(format!("{}: {e}", self.path.display())))
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl DraftStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| DraftError::StorageRead("file storage lock poisoned".to_string()))?;
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let write_error = |message: String| DraftError::StorageWrite {
            key: key.to_string(),
            message,
        };
        let _guard = self
            .lock
            .lock()
            .map_err(|_| write_error("file storage lock poisoned".to_string()))?;

        // A corrupt store is replaced rather than blocking every later save
        let mut entries = self.read_entries().unwrap_or_else(|err| {
            tracing::warn!("Discarding unreadable draft storage: {err}");
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
            .map_err(|e| write_error(e.to_string()))
    }
}
