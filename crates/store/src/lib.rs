//! `store` crate — the Book Store: domain models, record operations, and
//! error classification.
//!
//! Every caller goes through the [`BookStore`] trait. [`PgBookStore`] backs
//! it with Postgres via the `db` crate; [`mock::InMemoryBookStore`] is a
//! substitute backend for tests.

pub mod models;
pub mod error;
pub mod input;
pub mod traits;
pub mod postgres;
pub mod mock;

pub use models::{Book, BookInput};
pub use error::{ErrorKind, StoreError};
pub use traits::{check_health, BookStore, Health};
pub use postgres::PgBookStore;
