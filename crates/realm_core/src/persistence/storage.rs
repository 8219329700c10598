//! Durable key/value storage for save records.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("Storage IO error at '{path}': {source}")]
    Io {
        /// Path involved.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The record could not be serialized.
    #[error("Failed to serialize save record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The backend refused the write.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A place save records can be read from and written to.
pub trait SaveStorage: std::fmt::Debug {
    /// Read the record stored under `key`, or `None` if there is none.
    fn read(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the record stored under `key`.
    fn write(&mut self, key: &str, data: &str) -> StorageResult<()>;
}

/// In-memory storage. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    records: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: bool,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage whose writes always fail, for exercising best-effort saves.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Store a raw record directly.
    pub fn insert(&self, key: &str, data: &str) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), data.to_string());
    }

    /// Raw record currently stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl SaveStorage for MemoryStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.get(key))
    }

    fn write(&mut self, key: &str, data: &str) -> StorageResult<()> {
        if self.fail_writes {
            return Err(StorageError::Unavailable(format!("writes disabled for '{key}'")));
        }
        self.insert(key, data);
        Ok(())
    }
}

/// One JSON file per key inside a directory.
///
/// Writes go to a temporary file that is renamed over the target, so a
/// crash mid-write leaves the previous record intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir` (created on first write).
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the records.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for a key.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn io_error(path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl SaveStorage for FileStorage {
    fn read(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    fn write(&mut self, key: &str, data: &str) -> StorageResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| Self::io_error(&self.dir, e))?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        {
            let mut file = std::fs::File::create(&tmp).map_err(|e| Self::io_error(&tmp, e))?;
            file.write_all(data.as_bytes())
                .map_err(|e| Self::io_error(&tmp, e))?;
            file.sync_all().map_err(|e| Self::io_error(&tmp, e))?;
        }
        std::fs::rename(&tmp, &path).map_err(|e| Self::io_error(&path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_round_trip() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.read("slot").unwrap(), None);
        storage.write("slot", "{}").unwrap();
        assert_eq!(storage.read("slot").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_memory_storage_clones_share_records() {
        let storage = MemoryStorage::new();
        let mut writer = storage.clone();
        writer.write("slot", "data").unwrap();
        assert_eq!(storage.get("slot").as_deref(), Some("data"));
    }

    #[test]
    fn test_failing_storage() {
        let mut storage = MemoryStorage::failing();
        assert!(matches!(storage.write("slot", "{}"), Err(StorageError::Unavailable(_))));
        assert_eq!(storage.read("slot").unwrap(), None);
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("saves"));

        assert_eq!(storage.read("game").unwrap(), None);
        storage.write("game", "{\"mana\":1}").unwrap();
        storage.write("game", "{\"mana\":2}").unwrap();

        assert_eq!(storage.read("game").unwrap().as_deref(), Some("{\"mana\":2}"));
        assert!(!dir.path().join("saves/game.json.tmp").exists());
    }
}
