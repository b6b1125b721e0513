//! Storage-specific error types for SQLite operations.

use diesel::result::Error as DieselError;
use oneul_core::HistoryError;
use thiserror::Error;

/// Errors that wrap Diesel and r2d2 types.
///
/// Converted to [`HistoryError::Storage`] before leaving this crate through
/// the `KeyValueStore` trait.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[from] diesel::ConnectionError),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Query execution failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for HistoryError {
    fn from(err: StorageError) -> Self {
        HistoryError::Storage(err.to_string())
    }
}
