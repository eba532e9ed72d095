use bono_types::models::User;
use tracing::info;

use crate::{KeyValueStore, StorageError};

pub const CURRENT_USER_KEY: &str = "currentUser";

/// Snapshot of the logged-in user, kept apart from the record store and
/// dropped when the session ends.
pub struct SessionStore<S> {
    storage: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn current_user(&self) -> Result<Option<User>, StorageError> {
        match self.storage.get(CURRENT_USER_KEY)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::Corrupt {
                    key: CURRENT_USER_KEY.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    pub fn set_current_user(&self, user: &User) -> Result<(), StorageError> {
        let raw = serde_json::to_string(user).map_err(|source| StorageError::Encode {
            key: CURRENT_USER_KEY.to_string(),
            source,
        })?;
        self.storage.set(CURRENT_USER_KEY, raw)?;
        info!("Session started for '{}'", user.username);
        Ok(())
    }

    pub fn end(&self) -> Result<(), StorageError> {
        self.storage.clear()
    }
}
