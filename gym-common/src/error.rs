//! Common error types for the gym record manager

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for gym operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the gym crates
#[derive(Error, Debug)]
pub enum Error {
    /// Ledger database error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested member or document not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input (bad id, missing join date, zero-month membership)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Status change not allowed from the record's current status
    #[error("Cannot {action} member {id}: status is {current}")]
    InvalidTransition {
        id: String,
        action: &'static str,
        current: String,
    },

    /// Record root is missing or cannot be created
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(PathBuf),

    /// Internal error (e.g. a blocking task panicked)
    #[error("Internal error: {0}")]
    Internal(String),
}
