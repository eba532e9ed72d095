//! Shared data model for the Bono registration core.
//!
//! `models` holds the records persisted by `bono-db`; `api` holds the
//! request and response shapes exchanged with `bono-api` callers.

pub mod api;
pub mod models;
