//! Storage Layer
//!
//! Record store for student and mark collections, with an in-memory
//! backend and a SQLite backend behind the same repository trait.

mod models;
mod repository;
mod sqlite;

pub use models::{
    normalize_email, Mark, NewMark, NewStudent, PageWindow, Student, StudentFilter, StudentPatch,
};
pub use repository::{MemoryStore, RecordStore};
pub use sqlite::SqliteStore;

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Duplicate value for unique field {0}")]
    Conflict(&'static str),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict("email"),
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => Self::Connection(err.to_string()),
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

/// Open a record store from a connection string.
///
/// `memory://` selects the in-memory store; `sqlite:` URLs open (and create
/// if needed) a SQLite database.
pub async fn connect(url: &str) -> Result<Arc<dyn RecordStore>, StorageError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(StorageError::Connection("empty connection string".to_string()));
    }

    if url == "memory" || url.starts_with("memory://") {
        info!("Using in-memory record store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    if url.starts_with("sqlite:") {
        let store = SqliteStore::connect(url).await?;
        return Ok(Arc::new(store));
    }

    Err(StorageError::Connection(format!(
        "unsupported connection string scheme: {url}"
    )))
}
