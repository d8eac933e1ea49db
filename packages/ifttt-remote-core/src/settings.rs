//! Key-value settings storage.
//!
//! The service reads its configuration and persists the last dynamic-DNS
//! update marker through [`SettingsStore`]. Values are plain strings; an empty
//! string is treated the same as an absent key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

use crate::error::{RemoteError, RemoteResult};

/// File name of the settings store inside the data directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Trait for reading and writing string settings.
pub trait SettingsStore: Send + Sync {
    /// Returns the value for `key`, or `None` if it is absent or empty.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    fn set(&self, key: &str, value: &str) -> RemoteResult<()>;
}

/// In-memory settings store for tests and embedded use.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemorySettingsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `pairs`.
    pub fn with_values<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            values: RwLock::new(values),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .get(key)
            .filter(|v| !v.is_empty())
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> RemoteResult<()> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Settings persisted as a flat JSON object in the data directory.
///
/// Reads come from an in-memory copy loaded at open time. Every write is
/// flushed with an atomic write (temp file + rename).
pub struct JsonSettingsStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
    /// Serializes file writes.
    write_lock: Mutex<()>,
}

impl JsonSettingsStore {
    /// Opens the settings file in `data_dir`.
    ///
    /// A missing file yields an empty store. A file that is not a JSON object
    /// of strings is an error so that a typo never silently wipes settings.
    pub fn open(data_dir: &Path) -> RemoteResult<Self> {
        let path = data_dir.join(SETTINGS_FILE);
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                RemoteError::Settings(format!("Failed to parse {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!(
                    "[Settings] {} not found, starting with empty settings",
                    path.display()
                );
                BTreeMap::new()
            }
            Err(e) => {
                return Err(RemoteError::Settings(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
            write_lock: Mutex::new(()),
        })
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, values: &BTreeMap<String, String>) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(values)?;

        std::fs::write(&temp_path, contents)?;
        std::fs::rename(&temp_path, &self.path)
    }
}

impl SettingsStore for JsonSettingsStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .get(key)
            .filter(|v| !v.is_empty())
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> RemoteResult<()> {
        let _guard = self.write_lock.lock();
        let mut updated = self.values.read().clone();
        updated.insert(key.to_string(), value.to_string());

        // Memory only changes once the file holds the new value.
        self.save(&updated).map_err(|e| {
            RemoteError::Settings(format!("Failed to write {}: {}", self.path.display(), e))
        })?;
        *self.values.write() = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_treats_empty_as_absent() {
        let store = MemorySettingsStore::with_values([("userToken", ""), ("servicePort", "8090")]);
        assert_eq!(store.get("userToken"), None);
        assert_eq!(store.get("servicePort").as_deref(), Some("8090"));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn json_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::open(dir.path()).unwrap();
        assert_eq!(store.get("servicePort"), None);
    }

    #[test]
    fn json_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::open(dir.path()).unwrap();
        store.set("__prev_ip_update", "2024-03-01 12:00:00").unwrap();

        let reopened = JsonSettingsStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.get("__prev_ip_update").as_deref(),
            Some("2024-03-01 12:00:00")
        );
        assert!(!dir.path().join("settings.json.tmp").exists());
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let store = JsonSettingsStore::open(&data_dir).unwrap();
        store.set("servicePort", "8090").unwrap();

        // A regular file where the data directory should be breaks the save.
        std::fs::remove_dir_all(&data_dir).unwrap();
        std::fs::write(&data_dir, "").unwrap();

        assert!(matches!(
            store.set("servicePort", "9000"),
            Err(RemoteError::Settings(_))
        ));
        assert_eq!(store.get("servicePort").as_deref(), Some("8090"));
    }

    #[test]
    fn json_store_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "not json").unwrap();
        assert!(matches!(
            JsonSettingsStore::open(dir.path()),
            Err(RemoteError::Settings(_))
        ));
    }
}
