//! Error types for the IRRBB library.
//!
//! Every fallible operation in the crate returns [`IrrbbError`]. The HTTP
//! layer maps each variant to a status code through [`IrrbbError::http_status`].

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the IRRBB library.
#[derive(Debug, Error)]
pub enum IrrbbError {
    // Database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    #[error("PostgreSQL error: {message}")]
    Postgres {
        message: String,
        #[source]
        source: Option<tokio_postgres::Error>,
    },

    // Lookup errors
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: i64 },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for IRRBB operations.
pub type Result<T> = std::result::Result<T, IrrbbError>;

impl From<std::io::Error> for IrrbbError {
    fn from(err: std::io::Error) -> Self {
        IrrbbError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for IrrbbError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, ref detail) = err {
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
                return IrrbbError::Conflict {
                    message: detail
                        .clone()
                        .unwrap_or_else(|| "unique constraint violated".to_string()),
                };
            }
        }
        IrrbbError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<tokio_postgres::Error> for IrrbbError {
    fn from(err: tokio_postgres::Error) -> Self {
        if err.code() == Some(&tokio_postgres::error::SqlState::UNIQUE_VIOLATION) {
            return IrrbbError::Conflict {
                message: err
                    .as_db_error()
                    .map(|db| db.message().to_string())
                    .unwrap_or_else(|| "unique constraint violated".to_string()),
            };
        }
        IrrbbError::Postgres {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl IrrbbError {
    /// Create a validation error for a named field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        IrrbbError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        IrrbbError::Config {
            message: message.into(),
        }
    }

    /// HTTP status code for this error.
    ///
    /// - 404: instrument lookups that found nothing
    /// - 409: duplicate `instrument_id`
    /// - 422: request validation
    /// - 500: everything else
    pub fn http_status(&self) -> u16 {
        match self {
            IrrbbError::NotFound { .. } => 404,
            IrrbbError::Conflict { .. } => 409,
            IrrbbError::Validation { .. } => 422,
            _ => 500,
        }
    }

    /// Message shown to API clients.
    ///
    /// Lookup failures use the short `"<Kind> not found"` form; internal
    /// errors keep their full description.
    pub fn detail(&self) -> String {
        match self {
            IrrbbError::NotFound { kind, .. } => format!("{} not found", kind),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IrrbbError::NotFound { kind: "Loan", id: 7 };
        assert_eq!(err.to_string(), "Loan not found: 7");
        assert_eq!(err.detail(), "Loan not found");
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(IrrbbError::NotFound { kind: "Deposit", id: 1 }.http_status(), 404);
        assert_eq!(
            IrrbbError::Conflict {
                message: "dup".into()
            }
            .http_status(),
            409
        );
        assert_eq!(IrrbbError::validation("notional", "negative").http_status(), 422);
        assert_eq!(IrrbbError::config("bad url").http_status(), 500);
        assert_eq!(IrrbbError::Other("boom".into()).http_status(), 500);
    }

    #[test]
    fn test_unique_violation_becomes_conflict() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (k TEXT UNIQUE); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err: IrrbbError = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, IrrbbError::Conflict { .. }));
    }
}
