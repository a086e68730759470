//! Repository Module
//!
//! Module-level CRUD functions over the SQLite pool, one module per
//! table. Handlers pass `&SqlitePool` in; repositories never read
//! configuration or emit notifications themselves.

pub mod category;
pub mod setting;
pub mod ticket;
pub mod user;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Retryable conflict (e.g. a ticket number was taken concurrently)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Operation attempted from a ticket status that does not permit it
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Resource state forbids the operation (e.g. deleting an active category)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
