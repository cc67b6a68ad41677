//! Persisted key/value storage behind the session store.

use crate::db::Db;
use crate::Result;
use anyhow::bail;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A string-to-string store that survives restarts, the counterpart of a browser's local storage.
///
/// Multi-key writes and deletes must be all-or-nothing.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<()>;

    async fn remove_many(&self, keys: &[&str]) -> Result<()>;
}

/// Stores entries in the `kv_store` table of the SQLite database in `$FINN_HOME`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Db,
}

impl SqliteStore {
    pub(crate) fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.db.get(key).await
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.db.set_many(entries).await
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.db.remove_many(keys).await
    }
}

/// Keeps entries in memory only. Keys marked with `corrupt` fail to read, and `fail_writes`
/// makes every write and delete fail, which is how a broken persisted store is simulated.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    corrupt: Mutex<HashSet<String>>,
    read_only: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent read of `key` fail.
    pub fn corrupt(&self, key: &str) {
        if let Ok(mut corrupt) = self.corrupt.lock() {
            corrupt.insert(key.to_string());
        }
    }

    /// While `fail` is set, `set_many` and `remove_many` fail without touching any entry.
    pub fn fail_writes(&self, fail: bool) {
        self.read_only.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only.load(Ordering::SeqCst) {
            bail!("The memory store is not writable");
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let is_corrupt = match self.corrupt.lock() {
            Ok(corrupt) => corrupt.contains(key),
            Err(_) => bail!("Memory store lock poisoned"),
        };
        if is_corrupt {
            bail!("The value stored under '{key}' cannot be read");
        }
        match self.entries.lock() {
            Ok(entries) => Ok(entries.get(key).cloned()),
            Err(_) => bail!("Memory store lock poisoned"),
        }
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.check_writable()?;
        let Ok(mut map) = self.entries.lock() else {
            bail!("Memory store lock poisoned");
        };
        for (key, value) in entries {
            map.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.check_writable()?;
        let Ok(mut map) = self.entries.lock() else {
            bail!("Memory store lock poisoned");
        };
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}
