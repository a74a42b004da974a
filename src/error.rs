//! Custom error types for docvault

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for docvault operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Content of {} is not valid UTF-8 text", .0.display())]
    InvalidContent(PathBuf),

    #[error("Invalid doc key: {0}")]
    InvalidDocKey(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Storage unavailable at {}: {reason}", path.display())]
    StorageUnavailable { path: PathBuf, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("Import finished with {0} failed file(s)")]
    ImportFailed(usize),
}

impl Error {
    /// Map a failed INSERT, turning unique-index breaches into `ConstraintViolation`
    pub(crate) fn from_insert(err: sqlx::Error, doc_key: &str, version: i64) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Error::ConstraintViolation(format!(
                    "{} v{} conflicts with an existing row ({})",
                    doc_key,
                    version,
                    db_err.message()
                ))
            }
            other => Error::Database(other),
        }
    }

    /// Turn SQLite failures that mean the file cannot be opened or written
    /// (read-only, I/O error, disk full, cannot open) into `StorageUnavailable`
    pub(crate) fn on_storage(self, path: &Path) -> Self {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) if is_storage_failure(&*db_err) => {
                Error::StorageUnavailable {
                    path: path.to_path_buf(),
                    reason: db_err.message().to_string(),
                }
            }
            other => other,
        }
    }
}

// SQLITE_READONLY, SQLITE_IOERR, SQLITE_FULL, SQLITE_CANTOPEN
const STORAGE_FAILURE_CODES: [i32; 4] = [8, 10, 13, 14];

fn is_storage_failure(db_err: &dyn sqlx::error::DatabaseError) -> bool {
    // SQLite reports extended codes; the primary code is the low byte
    db_err
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| STORAGE_FAILURE_CODES.contains(&(code & 0xff)))
}

/// Result type alias for docvault
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_pass_through() {
        let err = Error::Database(sqlx::Error::RowNotFound).on_storage(Path::new("x.db"));
        assert!(matches!(err, Error::Database(sqlx::Error::RowNotFound)));

        let err = Error::InvalidDocKey("".into()).on_storage(Path::new("x.db"));
        assert!(matches!(err, Error::InvalidDocKey(_)));
    }
}
