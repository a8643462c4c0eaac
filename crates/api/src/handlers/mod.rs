//! Request handlers and the state they share.

use std::sync::Arc;

use store::BookStore;

pub mod books;
pub mod health;

/// Shared application state: one store for every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BookStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }
}
