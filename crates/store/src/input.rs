//! Parsing of raw caller input into typed operation arguments.
//!
//! Ids and year filters arrive as text; they are parsed here, before any
//! query runs, instead of relying on the database to coerce them.

use crate::{BookInput, StoreError};

/// Parse a book id from its textual form.
pub fn parse_id(raw: &str) -> Result<i32, StoreError> {
    raw.parse::<i32>()
        .map_err(|_| StoreError::Validation(format!("invalid book id '{raw}'")))
}

/// Parse an optional year filter. A missing or empty value means no filter.
pub fn parse_year_filter(raw: Option<&str>) -> Result<Option<i32>, StoreError> {
    match raw {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<i32>()
            .map(Some)
            .map_err(|_| StoreError::Validation(format!("invalid year filter '{raw}'"))),
    }
}

/// Decode a JSON request body into a [`BookInput`].
pub fn decode_book_input(body: &[u8]) -> Result<BookInput, StoreError> {
    serde_json::from_slice(body).map_err(|e| StoreError::Validation(e.to_string()))
}
