//! Registration and review workflows for the Bono benefit program.
//!
//! Validation failures are returned as data (`RegisterOutcome::Rejected`),
//! storage and authorization problems as `ApiError`.

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod error;
pub mod registration;
pub mod status;
pub mod validation;

pub use auth::{AppState, SqliteState};
pub use error::ApiError;
