use bono_db::{StorageError, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("no user is logged in")]
    NotLoggedIn,

    #[error("administrator access required")]
    NotAdmin,
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        ApiError::Store(StoreError::Storage(e))
    }
}
