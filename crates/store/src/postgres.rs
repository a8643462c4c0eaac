//! Postgres-backed [`BookStore`].

use async_trait::async_trait;
use tracing::{debug, error, info, instrument, warn};

use db::repository::books as book_repo;
use db::{DbConfig, DbPool, PoolSettings};

use crate::{Book, BookInput, BookStore, StoreError};

/// Book Store over an owned connection pool.
///
/// Cloning is cheap and shares the same pool.
#[derive(Clone)]
pub struct PgBookStore {
    pool: DbPool,
}

impl PgBookStore {
    /// Wrap an existing pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Build the pool and verify the connection.
    ///
    /// Every failure is a `StoreError::Startup`; the caller is expected to
    /// halt rather than retry.
    pub async fn connect(config: &DbConfig, settings: &PoolSettings) -> Result<Self, StoreError> {
        let pool = db::pool::create_pool(config, settings)
            .await
            .map_err(|err| {
                error!(error = %err, host = %config.host, "database startup failed");
                StoreError::from_db(err, None)
            })?;
        Ok(Self::new(pool))
    }

    /// Close every pooled connection. Further operations fail.
    pub async fn close(&self) {
        info!("closing database pool");
        self.pool.close().await;
    }
}

#[async_trait]
impl BookStore for PgBookStore {
    #[instrument(skip(self))]
    async fn list(&self, year: Option<i32>) -> Result<Vec<Book>, StoreError> {
        let listing = book_repo::list_books(&self.pool, year)
            .await
            .map_err(|e| StoreError::from_db(e, None))?;

        if listing.skipped > 0 {
            warn!(skipped = listing.skipped, "list omitted undecodable rows");
        }
        debug!(count = listing.rows.len(), "listed books");

        Ok(listing.rows.into_iter().map(Book::from).collect())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i32) -> Result<Book, StoreError> {
        let row = book_repo::get_book(&self.pool, id)
            .await
            .map_err(|e| StoreError::from_db(e, Some(id)))?;
        Ok(row.into())
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    async fn create(&self, input: &BookInput) -> Result<Book, StoreError> {
        let row = book_repo::create_book(&self.pool, input.fields())
            .await
            .map_err(|e| StoreError::from_db(e, None))?;
        info!(id = row.id, "book created");
        Ok(row.into())
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: i32, input: &BookInput) -> Result<Book, StoreError> {
        let row = book_repo::update_book(&self.pool, id, input.fields())
            .await
            .map_err(|e| StoreError::from_db(e, Some(id)))?;
        info!("book updated");
        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        book_repo::delete_book(&self.pool, id)
            .await
            .map_err(|e| StoreError::from_db(e, Some(id)))?;
        info!("book deleted");
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        db::pool::ping(&self.pool)
            .await
            .map_err(|e| StoreError::from_db(e, None))
    }
}
