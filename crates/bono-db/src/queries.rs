use crate::kv::Table;
use crate::{Database, StorageError};
use rusqlite::Connection;

impl Database {
    // -- Key-value tables --

    pub fn get_value(&self, table: Table, key: &str) -> Result<Option<String>, StorageError> {
        self.with_conn(|conn| query_value(conn, table, key))
    }

    /// Write every entry in one transaction: either all keys change or none do.
    pub fn set_values(&self, table: Table, entries: &[(&str, String)]) -> Result<(), StorageError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            {
                let sql = format!(
                    "INSERT INTO {} (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                    table.name()
                );
                let mut stmt = tx.prepare(&sql)?;
                for (key, value) in entries {
                    stmt.execute(rusqlite::params![*key, value.as_str()])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
    }

    pub fn remove_value(&self, table: Table, key: &str) -> Result<(), StorageError> {
        self.with_conn_mut(|conn| {
            conn.execute(&format!("DELETE FROM {} WHERE key = ?1", table.name()), [key])?;
            Ok(())
        })
    }

    pub fn clear_table(&self, table: Table) -> Result<(), StorageError> {
        self.with_conn_mut(|conn| {
            conn.execute(&format!("DELETE FROM {}", table.name()), [])?;
            Ok(())
        })
    }
}

fn query_value(conn: &Connection, table: Table, key: &str) -> Result<Option<String>, StorageError> {
    let mut stmt = conn.prepare(&format!("SELECT value FROM {} WHERE key = ?1", table.name()))?;

    let value: Option<String> = stmt.query_row([key], |row| row.get(0)).optional()?;

    Ok(value)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, StorageError>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, StorageError> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
