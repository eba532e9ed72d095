use std::fmt;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored value under `{key}` is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage lock poisoned")]
    LockPoisoned,
}

/// User fields that must be unique across the user collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Cedula,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Email => f.write_str("email"),
            UniqueField::Cedula => f.write_str("cedula"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("application not found: {0}")]
    ApplicationNotFound(Uuid),

    #[error("user not found: {0}")]
    UserNotFound(Uuid),

    #[error("{field} already registered: {value}")]
    Duplicate { field: UniqueField, value: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}
