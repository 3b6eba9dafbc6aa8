//! # Persistence
//!
//! The store keeps two records, one per collection, under fixed keys. Each
//! record is a versioned envelope:
//!
//! ```json
//! { "version": 1, "groups": [ ... ] }
//! ```
//!
//! A bare JSON array is the unversioned layout written by the earlier web
//! client and loads as version 0.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StorageError;

/// Key of the available-groups record.
pub const AVAILABLE_KEY: &str = "zkvip_available_groups";

/// Key of the joined-groups record.
pub const JOINED_KEY: &str = "zkvip_joined_groups";

/// Envelope version written by this crate.
pub const RECORD_VERSION: u32 = 1;

/// Key-value persistence for store records.
pub trait GroupStorage: Send + Sync {
    /// The record under `key`, or `None` if it was never written.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the record under `key`. Must be durable on return.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process storage; contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GroupStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key under a directory. Writes go to a temporary file
/// that is then renamed over the target.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`, created if missing.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::Io {
            key: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl GroupStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let io = |e: std::io::Error| StorageError::Io {
            key: key.to_string(),
            reason: e.to_string(),
        };
        let target = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, value).map_err(io)?;
        std::fs::rename(&tmp, &target).map_err(io)
    }
}

/// Decode a record, accepting the versioned envelope or a bare array.
pub(crate) fn decode_record<T: DeserializeOwned>(
    key: &str,
    raw: &str,
) -> Result<Vec<T>, StorageError> {
    let corrupt = |reason: String| StorageError::Corrupt {
        key: key.to_string(),
        reason,
    };

    let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| corrupt(e.to_string()))?;
    let groups = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => {
            let version = map
                .get("version")
                .and_then(serde_json::Value::as_u64)
                .ok_or_else(|| corrupt("missing version".to_string()))?;
            let version = u32::try_from(version).unwrap_or(u32::MAX);
            if version > RECORD_VERSION {
                return Err(StorageError::UnsupportedVersion {
                    key: key.to_string(),
                    version,
                });
            }
            map.remove("groups")
                .ok_or_else(|| corrupt("missing groups".to_string()))?
        }
        other => return Err(corrupt(format!("unexpected top-level value {other}"))),
    };
    serde_json::from_value(groups).map_err(|e| corrupt(e.to_string()))
}

/// Encode a record in the current envelope.
pub(crate) fn encode_record<T: Serialize>(key: &str, groups: &[T]) -> Result<String, StorageError> {
    serde_json::to_string(&serde_json::json!({
        "version": RECORD_VERSION,
        "groups": groups,
    }))
    .map_err(|e| StorageError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
