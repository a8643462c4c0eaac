//! Domain models for the Book Store.
//!
//! `Book` is what callers get back; `BookInput` is what they send. The
//! store owns `id`, `created_at` and `updated_at`, so `BookInput` has no
//! room for them and any such keys in a payload are ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use db::models::{BookFields, BookRow};

// ---------------------------------------------------------------------------
// Book
// ---------------------------------------------------------------------------

/// A persisted book as seen by callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Book {
    /// Assigned by the store, never reused.
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub year: i32,
    pub price: f64,
    /// Set once at insertion.
    pub created_at: DateTime<Utc>,
    /// Set at insertion and on every successful update.
    pub updated_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            author: row.author,
            isbn: row.isbn,
            year: row.year,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// BookInput
// ---------------------------------------------------------------------------

/// Caller-supplied fields for create and update. All of them are required.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub year: i32,
    pub price: f64,
}

impl BookInput {
    /// Borrow the input as statement parameters.
    pub fn fields(&self) -> BookFields<'_> {
        BookFields {
            title: &self.title,
            author: &self.author,
            isbn: &self.isbn,
            year: self.year,
            price: self.price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_serialises_with_snake_case_timestamps() {
        let now = Utc::now();
        let book = Book {
            id: 1,
            title: "Dune".into(),
            author: "Herbert".into(),
            isbn: "111".into(),
            year: 1965,
            price: 9.99,
            created_at: now,
            updated_at: now,
        };

        let value = serde_json::to_value(&book).expect("serialise");
        for key in ["id", "title", "author", "isbn", "year", "price", "created_at", "updated_at"] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(value["year"], 1965);
    }

    #[test]
    fn fields_borrow_every_column() {
        let input = BookInput {
            title: "Dune".into(),
            author: "Herbert".into(),
            isbn: "111".into(),
            year: 1965,
            price: 9.99,
        };

        let fields = input.fields();
        assert_eq!(fields.title, "Dune");
        assert_eq!(fields.author, "Herbert");
        assert_eq!(fields.isbn, "111");
        assert_eq!(fields.year, 1965);
        assert_eq!(fields.price, 9.99);
    }
}
