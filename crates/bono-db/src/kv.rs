use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::{Database, StorageError};

/// Blob storage keyed by string, the backing for both the record store and
/// the session.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Atomic multi-key write.
    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;

    fn clear(&self) -> Result<(), StorageError>;

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.set_many(&[(key, value)])
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        (**self).set_many(entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}

/// Which SQLite table a `SqliteStore` reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// Survives restarts.
    Local,
    /// Cleared when the session ends.
    Session,
}

impl Table {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Table::Local => "kv_store",
            Table::Session => "session_store",
        }
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Database>,
    table: Table,
}

impl SqliteStore {
    pub fn new(db: Arc<Database>, table: Table) -> Self {
        Self { db, table }
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.db.get_value(self.table, key)
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        self.db.set_values(self.table, entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.db.remove_value(self.table, key)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.db.clear_table(self.table)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set_many(&self, new_entries: &[(&str, String)]) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::LockPoisoned)?;
        for (key, value) in new_entries {
            entries.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::LockPoisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::LockPoisoned)?;
        entries.clear();
        Ok(())
    }
}
