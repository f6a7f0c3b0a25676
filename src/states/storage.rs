// Key-value persistence used for buffer texts and UI toggles.
//
// The playground only ever needs "get a string" / "set a string", so the
// backends stay deliberately small. `FileStore` rewrites the whole JSON file
// on every write; the payload is two text buffers and a handful of flags.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write settings store '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode settings store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Minimal get/set-string persistence capability.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store. Nothing survives the session.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON-file backed store living in the user's data directory.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "ignoring corrupt settings store");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "opened settings store");
        Self { path, entries }
    }

    /// Default location: `<data dir>/settings.json`.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("org", "peg", "peg-playground")
            .map(|dirs| dirs.data_dir().join("settings.json"))
            .unwrap_or_else(|| PathBuf::from("peg-playground-settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(&self.entries)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }
        fs::write(&self.path, content).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.entries.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(err) = self.flush() {
            // Roll back so a retry with the same value writes again.
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }
}

/// Either backend, picked at startup from the command line.
#[derive(Debug)]
pub enum AnyStore {
    Memory(MemoryStore),
    File(FileStore),
}

impl KeyValueStore for AnyStore {
    fn get_item(&self, key: &str) -> Option<String> {
        match self {
            AnyStore::Memory(store) => store.get_item(key),
            AnyStore::File(store) => store.get_item(key),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            AnyStore::Memory(store) => store.set_item(key, value),
            AnyStore::File(store) => store.set_item(key, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn memory_store_returns_what_was_set() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get_item("grammarText"), None);
        store.set_item("grammarText", "start <- 'a'").unwrap();
        assert_eq!(store.get_item("grammarText").as_deref(), Some("start <- 'a'"));
    }

    #[test]
    fn file_store_survives_reopen() {
        let td = tempdir().expect("tempdir");
        let path = td.path().join("nested").join("settings.json");

        let mut store = FileStore::open(&path);
        store.set_item("packrat", "true").unwrap();
        store.set_item("codeText", "a\nb").unwrap();
        assert!(path.exists());

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get_item("packrat").as_deref(), Some("true"));
        assert_eq!(reopened.get_item("codeText").as_deref(), Some("a\nb"));
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let td = tempdir().expect("tempdir");
        let path = td.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let store = FileStore::open(&path);
        assert_eq!(store.get_item("packrat"), None);
    }

    #[test]
    fn unwritable_location_reports_error() {
        let td = tempdir().expect("tempdir");
        // A directory where the file should be makes the write fail.
        let path = td.path().join("settings.json");
        fs::create_dir(&path).unwrap();

        let mut store = FileStore::open(&path);
        assert!(matches!(
            store.set_item("packrat", "true"),
            Err(StoreError::Write { .. })
        ));
        assert_eq!(store.get_item("packrat"), None);
    }

    #[test]
    fn failed_write_is_retried_with_the_same_value() {
        let td = tempdir().expect("tempdir");
        let path = td.path().join("settings.json");
        fs::create_dir(&path).unwrap();

        let mut store = FileStore::open(&path);
        assert!(store.set_item("codeText", "a").is_err());
        assert!(store.set_item("codeText", "a").is_err());

        fs::remove_dir(&path).unwrap();
        store.set_item("codeText", "a").unwrap();
        assert_eq!(
            FileStore::open(&path).get_item("codeText").as_deref(),
            Some("a")
        );
    }
}
