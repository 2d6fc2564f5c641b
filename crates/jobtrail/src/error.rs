use std::path::PathBuf;
use thiserror::Error;

use crate::cursor::CursorError;
use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum JobtrailError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("Cursor error: {0}")]
    Cursor(#[from] CursorError),

    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Coarse failure classes exposed at the call boundary. Callers use the
/// category to decide whether a retry can help.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed input — not retryable.
    Validation,
    /// Missing store or file — not retryable.
    NotFound,
    /// Transient transaction/connection failure — retryable.
    Storage,
    /// Unexpected — retryable, conservatively.
    Internal,
}

impl JobtrailError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            JobtrailError::Validation { .. } => ErrorCategory::Validation,
            JobtrailError::Config(_) => ErrorCategory::Validation,
            JobtrailError::Cursor(_) => ErrorCategory::Validation,
            JobtrailError::NotFound { .. } => ErrorCategory::NotFound,
            JobtrailError::Internal { .. } => ErrorCategory::Internal,
            JobtrailError::Tracker(e) => match e {
                TrackerError::Malformed { .. } | TrackerError::AlreadyExists { .. } => {
                    ErrorCategory::Validation
                }
                TrackerError::Read { source, .. }
                    if source.kind() == std::io::ErrorKind::NotFound =>
                {
                    ErrorCategory::NotFound
                }
                TrackerError::Read { .. } | TrackerError::Write { .. } => ErrorCategory::Storage,
            },
            JobtrailError::Database(e) => match e {
                DatabaseError::BatchRejected { .. } => ErrorCategory::Validation,
                DatabaseError::SchemaPreflight { .. } => ErrorCategory::Internal,
                DatabaseError::Sqlite(_)
                | DatabaseError::Io { .. }
                | DatabaseError::Migration { .. }
                | DatabaseError::LockPoisoned => ErrorCategory::Storage,
            },
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Storage | ErrorCategory::Internal
        )
    }

    /// Message safe to surface to a remote caller: filesystem paths are
    /// reduced to basenames and storage-engine statement text is scrubbed.
    pub fn public_message(&self) -> String {
        use crate::sanitize;

        match self {
            JobtrailError::Tracker(e) => match e {
                TrackerError::Read { path, .. } => {
                    format!("failed to read tracker '{}'", sanitize::redact_path(path))
                }
                TrackerError::Malformed { path, reason } => {
                    format!(
                        "malformed tracker '{}': {}",
                        sanitize::redact_path(path),
                        reason
                    )
                }
                TrackerError::Write { path, .. } => {
                    format!("failed to write tracker '{}'", sanitize::redact_path(path))
                }
                TrackerError::AlreadyExists { path } => {
                    format!("tracker '{}' already exists", sanitize::redact_path(path))
                }
            },
            JobtrailError::Database(e) => sanitize::scrub_sql(&e.to_string()),
            JobtrailError::Config(ConfigError::ReadFile { path, .. }) => {
                format!("failed to read config '{}'", sanitize::redact_path(path))
            }
            other => other.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Failed to read tracker '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed tracker '{path}': {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("Failed to write tracker '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Tracker already exists: {path}")]
    AlreadyExists { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, JobtrailError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_not_retryable() {
        let err = JobtrailError::Validation {
            message: "bad".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_missing_tracker_is_not_found() {
        let err = JobtrailError::Tracker(TrackerError::Read {
            path: PathBuf::from("/vault/acme.md"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        });
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_tracker_write_is_retryable_storage() {
        let err = JobtrailError::Tracker(TrackerError::Write {
            path: PathBuf::from("/vault/acme.md"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        });
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_cursor_errors_are_validation() {
        let err = JobtrailError::Cursor(CursorError::BadEncoding);
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn test_batch_rejection_is_validation() {
        let err = JobtrailError::Database(DatabaseError::BatchRejected {
            reason: "too big".to_string(),
        });
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_schema_preflight_is_internal() {
        let err = JobtrailError::Database(DatabaseError::SchemaPreflight {
            table: "jobs",
            column: "updated_at",
        });
        assert_eq!(err.category(), ErrorCategory::Internal);
    }

    #[test]
    fn test_public_message_reduces_paths_to_basenames() {
        let err = JobtrailError::Tracker(TrackerError::Read {
            path: PathBuf::from("/home/user/vault/trackers/acme.md"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        });
        let message = err.public_message();
        assert!(message.contains("acme.md"));
        assert!(!message.contains("/home/user"));
    }

    #[test]
    fn test_public_message_scrubs_sql() {
        let err = JobtrailError::Database(DatabaseError::Sqlite(
            rusqlite::Error::InvalidQuery,
        ));
        // rusqlite's InvalidQuery message carries no statement, but a
        // migration failure may echo one.
        let err2 = JobtrailError::Database(DatabaseError::Migration {
            version: 1,
            reason: "syntax error in CREATE TABLE jobs (id INTEGER)".to_string(),
        });
        assert!(!err.public_message().is_empty());
        assert!(!err2.public_message().contains("CREATE TABLE"));
    }
}
