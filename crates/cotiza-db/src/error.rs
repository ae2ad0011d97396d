//! # Storage Error Types
//!
//! Error types for storage operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / MigrateError / serde_json::Error                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module)                                                 │
//! │       │                                                                 │
//! │       ├── read paths:  logged with warn!, replaced by a default        │
//! │       │                (empty list, seeded catalog, no draft)          │
//! │       │                                                                 │
//! │       └── write paths: returned to the caller                          │
//! │                                                                         │
//! │  DbError::Format is the only error an import can surface on its own:   │
//! │  the payload was not a JSON array.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// The backend could not read or write a key.
    ///
    /// ## When This Occurs
    /// - Disk full or file permissions issue
    /// - Query failed at runtime
    /// - Pool closed or timed out
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - Invalid database path
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// An import payload is not usable.
    ///
    /// ## When This Occurs
    /// - Payload is not valid JSON
    /// - Top level is not an array
    #[error("Invalid import format: {0}")]
    Format(String),

    /// A value could not be encoded to JSON.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration could not be loaded.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A file (config, import payload) could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbError {
    /// Creates a Format error.
    pub fn format(reason: impl Into<String>) -> Self {
        DbError::Format(reason.into())
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// Other                       → DbError::StorageUnavailable
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            _ => DbError::StorageUnavailable(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<toml::de::Error> for DbError {
    fn from(err: toml::de::Error) -> Self {
        DbError::Config(err.to_string())
    }
}

/// Result type for storage operations.
pub type DbResult<T> = Result<T, DbError>;
