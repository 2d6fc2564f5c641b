//! Database error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// SQLite error from rusqlite.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error when creating directories or files.
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A migration failed to apply.
    #[error("Migration failed at version {version}: {reason}")]
    Migration { version: u32, reason: String },

    /// A batch was rejected before touching storage (over the size cap or
    /// containing duplicate ids).
    #[error("Batch rejected: {reason}")]
    BatchRejected { reason: String },

    /// A required column is missing from the schema. Raised by the batch
    /// writer preflight; this is a deployment fault, not a per-item failure.
    #[error("Schema preflight failed: column '{column}' missing from table '{table}'")]
    SchemaPreflight {
        table: &'static str,
        column: &'static str,
    },

    /// The database lock was poisoned.
    #[error("Database lock poisoned")]
    LockPoisoned,
}
