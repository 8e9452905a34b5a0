//! Key-value string storage behind the saved-search store

use super::error::StorageError;
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Persistence boundary: string values addressed by string keys
pub trait SearchStorage: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// In-process storage with an optional byte quota over keys and values
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<DashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            quota: Some(quota),
        }
    }

    /// Bytes currently held, keys included
    pub fn used_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.key().len() + entry.value().len())
            .sum()
    }
}

impl SearchStorage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).map(|value| value.clone()))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if let Some(quota) = self.quota {
            let replaced = self
                .entries
                .get(key)
                .map(|old| key.len() + old.len())
                .unwrap_or(0);
            let needed = self.used_bytes() - replaced + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// On-disk storage in a sled tree
#[derive(Clone)]
pub struct SledStorage {
    db: Arc<sled::Db>,
    tree: sled::Tree,
}

impl SledStorage {
    const TREE: &'static str = "saved_searches";

    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let db = sled::open(path.as_ref()).map_err(|e| {
            StorageError::Backend(format!("Failed to open sled database: {}", e))
        })?;

        tracing::info!(path = %path.as_ref().display(), "Opened saved-search storage");

        Self::from_db(db)
    }

    /// Storage over an already open database.
    ///
    /// sled holds a file lock until its background flusher lets go of the
    /// database, so code that reopens the same path in one process should
    /// share a single `sled::Db` through this constructor.
    pub fn from_db(db: sled::Db) -> StorageResult<Self> {
        let tree = db.open_tree(Self::TREE).map_err(|e| {
            StorageError::Backend(format!("Failed to open {} tree: {}", Self::TREE, e))
        })?;

        Ok(Self {
            db: Arc::new(db),
            tree,
        })
    }

    pub fn flush(&self) -> StorageResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl SearchStorage for SledStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        match self.tree.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.tree.insert(key.as_bytes(), value.as_bytes())?;
        self.tree.flush()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.tree.remove(key.as_bytes())?;
        self.tree.flush()?;
        Ok(())
    }
}
