//! The `BookStore` trait — the contract every backend must fulfil.

use async_trait::async_trait;
use serde::Serialize;

use crate::{Book, BookInput, StoreError};

/// The five record operations plus a liveness probe.
///
/// Implementations hold no per-request state; one instance is shared by
/// every caller.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books, or only those whose `year` equals the filter. Never fails
    /// because nothing matched.
    async fn list(&self, year: Option<i32>) -> Result<Vec<Book>, StoreError>;

    /// Exactly one book, or `StoreError::NotFound`.
    async fn get(&self, id: i32) -> Result<Book, StoreError>;

    /// Insert a book and return it with the store-assigned fields.
    async fn create(&self, input: &BookInput) -> Result<Book, StoreError>;

    /// Replace the writable fields of a book and bump `updated_at`.
    async fn update(&self, id: i32, input: &BookInput) -> Result<Book, StoreError>;

    /// Remove a book.
    async fn delete(&self, id: i32) -> Result<(), StoreError>;

    /// Confirm the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Result of a liveness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Health {
    Healthy,
    Unhealthy { error: String },
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Ping the store and report the outcome instead of failing.
pub async fn check_health(store: &dyn BookStore) -> Health {
    match store.ping().await {
        Ok(()) => Health::Healthy,
        Err(err) => {
            tracing::warn!(error = %err, "health check failed");
            Health::Unhealthy {
                error: err.to_string(),
            }
        }
    }
}
