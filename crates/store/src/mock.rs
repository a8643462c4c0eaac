//! `InMemoryBookStore` — a substitute backend for [`BookStore`].
//!
//! Keeps the same contract as the Postgres store (ids never reused,
//! `created_at` fixed, `updated_at` never moving backwards) so callers can
//! be tested without a database.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::{Book, BookInput, BookStore, StoreError};

#[derive(Default)]
struct State {
    last_id: i32,
    books: BTreeMap<i32, Book>,
    /// When set, every operation fails with this backend message.
    outage: Option<String>,
}

/// A `BookStore` held entirely in process memory.
#[derive(Default)]
pub struct InMemoryBookStore {
    state: Mutex<State>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail as if the backend were down.
    pub fn fail_with(&self, message: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.outage = Some(message.into());
        }
    }

    /// Clear a simulated outage.
    pub fn recover(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.outage = None;
        }
    }

    /// Number of books currently stored.
    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.books.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        let state = self
            .state
            .lock()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))?;
        if let Some(message) = &state.outage {
            return Err(StoreError::Backend(message.clone()));
        }
        Ok(state)
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn list(&self, year: Option<i32>) -> Result<Vec<Book>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .books
            .values()
            .filter(|book| year.map_or(true, |y| book.year == y))
            .cloned()
            .collect())
    }

    async fn get(&self, id: i32) -> Result<Book, StoreError> {
        let state = self.lock()?;
        state
            .books
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    async fn create(&self, input: &BookInput) -> Result<Book, StoreError> {
        let mut state = self.lock()?;
        state.last_id += 1;
        let now = Utc::now();
        let book = Book {
            id: state.last_id,
            title: input.title.clone(),
            author: input.author.clone(),
            isbn: input.isbn.clone(),
            year: input.year,
            price: input.price,
            created_at: now,
            updated_at: now,
        };
        state.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update(&self, id: i32, input: &BookInput) -> Result<Book, StoreError> {
        let mut state = self.lock()?;
        let book = state
            .books
            .get_mut(&id)
            .ok_or(StoreError::NotFound { id })?;

        book.title = input.title.clone();
        book.author = input.author.clone();
        book.isbn = input.isbn.clone();
        book.year = input.year;
        book.price = input.price;
        book.updated_at = Utc::now().max(book.updated_at);

        Ok(book.clone())
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state
            .books
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { id })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }
}
