//! Typed error type for the db crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("row not found")]
    NotFound,

    /// The initial handshake with the database failed.
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("invalid pool settings: {0}")]
    InvalidSettings(String),
}
