//! Local fallback cache backed by redb
//!
//! Durable key-value store that survives restarts. Holds a shadow copy of
//! submissions and the settings snapshot for when the hosted store is
//! unreachable.
//!
//! # Tables
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | `local_cache` | [`CacheKey`] name | JSON document |
//!
//! No TTL and no eviction: entries accumulate until overwritten.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// key = logical collection name, value = JSON-serialized document
const CACHE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("local_cache");

/// Logical collections held in the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey {
    /// `Vec<UserSubmission>`, most recent first
    Submissions,
    /// `AdminSettings`
    AdminSettings,
}

impl CacheKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKey::Submissions => "submissions",
            CacheKey::AdminSettings => "adminSettings",
        }
    }
}

/// Cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Clone)]
pub struct LocalCache {
    db: Arc<Database>,
}

impl LocalCache {
    /// Open or create the cache file at `path`
    pub fn open(path: impl AsRef<Path>) -> CacheResult<Self> {
        Self::init(Database::create(path)?)
    }

    /// Non-durable cache (tests and throwaway dev runs)
    pub fn open_in_memory() -> CacheResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> CacheResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CACHE_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// `Ok(None)` when the key was never written
    pub fn get<T: DeserializeOwned>(&self, key: CacheKey) -> CacheResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CACHE_TABLE)?;
        match table.get(key.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize>(&self, key: CacheKey, value: &T) -> CacheResult<()> {
        let bytes = serde_json::to_vec(value)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CACHE_TABLE)?;
            table.insert(key.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn remove(&self, key: CacheKey) -> CacheResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(CACHE_TABLE)?;
            table.remove(key.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Read-modify-write inside a single write transaction.
    ///
    /// A missing key starts from `T::default()`; `f`'s return value is
    /// passed back to the caller. Nothing is written if `f` fails.
    pub fn update<T, R, E>(&self, key: CacheKey, f: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E>
    where
        T: Serialize + DeserializeOwned + Default,
        E: From<CacheError>,
    {
        let write_txn = self.db.begin_write().map_err(CacheError::from)?;
        let result = {
            let mut table = write_txn.open_table(CACHE_TABLE).map_err(CacheError::from)?;
            let mut value: T = match table.get(key.as_str()).map_err(CacheError::from)? {
                Some(bytes) => serde_json::from_slice(bytes.value()).map_err(CacheError::from)?,
                None => T::default(),
            };
            let result = f(&mut value)?;
            let bytes = serde_json::to_vec(&value).map_err(CacheError::from)?;
            table
                .insert(key.as_str(), bytes.as_slice())
                .map_err(CacheError::from)?;
            result
        };
        write_txn.commit().map_err(CacheError::from)?;
        Ok(result)
    }
}
