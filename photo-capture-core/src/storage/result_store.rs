use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::traits::result_store::ResultStore;

/// Key under which the latest analysis result is stored.
pub const ANALYSIS_RESULT_KEY: &str = "analysisResult";

/// Key under which the RFC 3339 timestamp of the latest analysis is stored.
pub const ANALYSIS_TIMESTAMP_KEY: &str = "analysisTimestamp";

/// In-process store, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    entries: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryResultStore {
    fn put(&self, key: &str, value: &serde_json::Value) -> Result<(), CaptureError> {
        self.entries.lock().insert(key.to_string(), value.clone());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CaptureError> {
        Ok(self.entries.lock().get(key).cloned())
    }
}

/// Store that keeps each key as a pretty-printed JSON file.
///
/// `{directory}/{key}.json`; the directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileResultStore {
    directory: PathBuf,
}

impl FileResultStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CaptureError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CaptureError::StorageError(format!("invalid key: {:?}", key)));
        }
        Ok(self.directory.join(format!("{}.json", key)))
    }
}

impl ResultStore for FileResultStore {
    fn put(&self, key: &str, value: &serde_json::Value) -> Result<(), CaptureError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.directory)
            .map_err(|e| CaptureError::StorageError(format!("failed to create directory: {}", e)))?;
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| CaptureError::StorageError(format!("failed to serialize {}: {}", key, e)))?;
        fs::write(&path, json)
            .map_err(|e| CaptureError::StorageError(format!("failed to write {}: {}", key, e)))?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CaptureError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .map_err(|e| CaptureError::StorageError(format!("failed to read {}: {}", key, e)))?;
        let value = serde_json::from_str(&json)
            .map_err(|e| CaptureError::StorageError(format!("failed to parse {}: {}", key, e)))?;
        Ok(Some(value))
    }
}
