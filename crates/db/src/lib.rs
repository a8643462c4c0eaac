//! `db` crate — pure persistence layer.
//!
//! Provides a connection pool, the `books` row struct, and one repository
//! function per SQL statement. No business logic lives here.

pub mod error;
pub mod pool;
pub mod repository;
pub mod models;

pub use pool::{DbPool, DbConfig, PoolSettings};
pub use error::DbError;

/// Re-exported so dependants can name `sqlx::Error` without their own dependency.
pub use sqlx;
