use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::ClientError;

/// Durable key names shared with the web dashboard's local storage layout.
pub const TOKEN_KEY: &str = "token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

/// Abstraction over the client's durable key-value storage.
///
/// Backed by a JSON file for the console and an in-memory map in tests.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError>;
    fn set(&self, key: &str, value: &str) -> Result<(), ClientError>;
    fn remove(&self, key: &str) -> Result<(), ClientError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation (tests, mock mode)
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded store, handy for restore scenarios.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let data = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            data: Mutex::new(data),
        }
    }

    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.data.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.data.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        self.data.lock().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed implementation
// ---------------------------------------------------------------------------

/// A flat JSON object on disk, rewritten on every change.
pub struct FileStore {
    path: PathBuf,
    data: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// An unreadable or corrupt file is logged and treated as empty; it is
    /// replaced on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref().to_path_buf();
        let data = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    tracing::error!(?e, path = %path.display(), "corrupt session file, starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                tracing::error!(?e, path = %path.display(), "session file unreadable");
                return Err(ClientError::Storage(e.to_string()));
            }
        };

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    fn flush(&self, data: &HashMap<String, String>) -> Result<(), ClientError> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| ClientError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                tracing::error!(?e, path = %self.path.display(), "session file write failed");
                ClientError::Storage(e.to_string())
            })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ClientError> {
        Ok(self.data.lock().get(key).cloned())
    }

    // Memory only changes once the disk has the new contents.
    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let mut data = self.data.lock();
        let mut next = data.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *data = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        let mut data = self.data.lock();
        if !data.contains_key(key) {
            return Ok(());
        }
        let mut next = data.clone();
        next.remove(key);
        self.flush(&next)?;
        *data = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let store = MemoryStore::new();
        store.set(TOKEN_KEY, "abc").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        store.remove(TOKEN_KEY).unwrap();
        assert!(store.get(TOKEN_KEY).unwrap().is_none());
        // Removing a missing key is fine.
        store.remove(TOKEN_KEY).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = FileStore::open(&path).unwrap();
        store.set(TOKEN_KEY, "tok").unwrap();
        store.set(USER_KEY, r#"{"id":1}"#).unwrap();
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("tok"));
        assert_eq!(reopened.get(USER_KEY).unwrap().as_deref(), Some(r#"{"id":1}"#));

        reopened.remove(TOKEN_KEY).unwrap();
        let again = FileStore::open(&path).unwrap();
        assert!(again.get(TOKEN_KEY).unwrap().is_none());
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileStore::open(&path).unwrap();
        store.set(TOKEN_KEY, "kept").unwrap();

        // A directory where the temp file should go makes every write fail.
        fs::create_dir(path.with_extension("tmp")).unwrap();

        assert!(matches!(store.set(TOKEN_KEY, "lost"), Err(ClientError::Storage(_))));
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("kept"));
        assert!(store.remove(TOKEN_KEY).is_err());
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json at all").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert!(store.get(TOKEN_KEY).unwrap().is_none());

        store.set(TOKEN_KEY, "fresh").unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("fresh"));
    }
}
