//! Store-level error classification.

use thiserror::Error;

use db::DbError;

/// The caller-visible class of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Backend,
    Startup,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Validation => "validation_error",
            Self::Backend => "backend_error",
            Self::Startup => "startup_error",
        }
    }
}

/// Errors returned by every [`BookStore`](crate::BookStore) operation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// No row has the targeted id.
    #[error("book not found")]
    NotFound { id: i32 },

    /// The payload, id or filter could not be decoded.
    #[error("{0}")]
    Validation(String),

    /// Anything else the database reported, with its own diagnostic text.
    #[error("{0}")]
    Backend(String),

    /// The initial pool connection could not be established.
    #[error("startup failed: {0}")]
    Startup(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Backend(_) => ErrorKind::Backend,
            Self::Startup(_) => ErrorKind::Startup,
        }
    }

    /// Classify a db failure for an operation that targeted `id`.
    ///
    /// A missing row only means `NotFound` when an id was targeted; for
    /// anything else it is a backend failure.
    pub fn from_db(err: DbError, id: Option<i32>) -> Self {
        match (err, id) {
            (DbError::NotFound, Some(id)) => Self::NotFound { id },
            (DbError::NotFound, None) => Self::Backend("row not found".to_string()),
            (DbError::Connect(e), _) => Self::Startup(e.to_string()),
            (DbError::InvalidSettings(msg), _) => Self::Startup(msg),
            (DbError::Sqlx(e), _) => Self::Backend(e.to_string()),
        }
    }
}
