use std::sync::Arc;

use bono_db::{Database, KeyValueStore, MemoryStore, RecordStore, SessionStore, SqliteStore, Table};
use bono_types::models::User;
use tracing::{info, warn};

use crate::error::ApiError;

/// Everything a caller needs, built once at startup and passed by reference.
pub struct AppState<S, T> {
    pub records: RecordStore<S>,
    pub session: SessionStore<T>,
}

pub type SqliteState = AppState<SqliteStore, SqliteStore>;

impl SqliteState {
    pub fn open(db: Arc<Database>) -> Result<Self, ApiError> {
        let records = RecordStore::initialize(SqliteStore::new(db.clone(), Table::Local))?;
        let session = SessionStore::new(SqliteStore::new(db, Table::Session));
        Ok(Self { records, session })
    }
}

impl AppState<MemoryStore, MemoryStore> {
    pub fn in_memory() -> Result<Self, ApiError> {
        Ok(Self {
            records: RecordStore::initialize(MemoryStore::new())?,
            session: SessionStore::new(MemoryStore::new()),
        })
    }
}

/// Check credentials and remember the user for the rest of the session.
pub fn login<S: KeyValueStore, T: KeyValueStore>(
    state: &AppState<S, T>,
    username: &str,
    password: &str,
) -> Result<User, ApiError> {
    let Some(user) = state.records.authenticate(username, password).cloned() else {
        warn!("Failed login for '{}'", username);
        return Err(ApiError::InvalidCredentials);
    };

    state.session.set_current_user(&user)?;
    Ok(user)
}

pub fn logout<S, T: KeyValueStore>(state: &AppState<S, T>) -> Result<(), ApiError> {
    state.session.end()?;
    info!("Session ended");
    Ok(())
}

pub fn current_user<S, T: KeyValueStore>(state: &AppState<S, T>) -> Result<User, ApiError> {
    state.session.current_user()?.ok_or(ApiError::NotLoggedIn)
}

pub fn require_admin<S, T: KeyValueStore>(state: &AppState<S, T>) -> Result<User, ApiError> {
    let user = current_user(state)?;
    if !user.is_admin() {
        return Err(ApiError::NotAdmin);
    }
    Ok(user)
}
