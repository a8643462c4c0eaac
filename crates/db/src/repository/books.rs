//! `books` table CRUD operations.
//!
//! Writes use `RETURNING` so the server-assigned columns come back in the
//! same round trip as the write itself.

use futures::{Stream, TryStreamExt};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool};
use tracing::warn;

use crate::{
    DbError,
    models::{BookFields, BookRow},
};

// ---------------------------------------------------------------------------
// Lazy row decoding
// ---------------------------------------------------------------------------

/// Outcome of decoding one fetched row.
#[derive(Debug)]
pub enum Decoded<T> {
    Row(T),
    /// The row came back from the database but could not be mapped.
    Skipped(sqlx::Error),
}

/// Rows that decoded, plus a count of those that did not.
#[derive(Debug)]
pub struct Listing<T> {
    pub rows: Vec<T>,
    pub skipped: usize,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            skipped: 0,
        }
    }
}

/// Attach a decode attempt to every row of a fetch stream.
///
/// Stream errors stay errors (the query failed); decode errors become
/// [`Decoded::Skipped`] so the caller can keep going.
pub fn decode_rows<S, R, T, F>(
    rows: S,
    mut decode: F,
) -> impl Stream<Item = Result<Decoded<T>, sqlx::Error>>
where
    S: Stream<Item = Result<R, sqlx::Error>>,
    F: FnMut(&R) -> Result<T, sqlx::Error>,
{
    rows.map_ok(move |row| match decode(&row) {
        Ok(value) => Decoded::Row(value),
        Err(err) => Decoded::Skipped(err),
    })
}

/// Drain a decoded stream, logging and counting skipped rows.
pub async fn collect_listing<S, T>(decoded: S) -> Result<Listing<T>, DbError>
where
    S: Stream<Item = Result<Decoded<T>, sqlx::Error>>,
{
    let mut decoded = std::pin::pin!(decoded);
    let mut listing = Listing::default();

    while let Some(item) = decoded.try_next().await? {
        match item {
            Decoded::Row(row) => listing.rows.push(row),
            Decoded::Skipped(err) => {
                warn!(error = %err, "skipping row that failed to decode");
                listing.skipped += 1;
            }
        }
    }

    Ok(listing)
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

/// Return every book, or only those published in `year`.
///
/// Rows that fail to decode are skipped rather than failing the whole list.
pub async fn list_books(pool: &PgPool, year: Option<i32>) -> Result<Listing<BookRow>, DbError> {
    let rows = match year {
        Some(year) => sqlx::query(
            r#"
            SELECT id, title, author, isbn, year, price, created_at, updated_at
            FROM books
            WHERE year = $1
            "#,
        )
        .bind(year)
        .fetch(pool),
        None => sqlx::query(
            r#"SELECT id, title, author, isbn, year, price, created_at, updated_at FROM books"#,
        )
        .fetch(pool),
    };

    collect_listing(decode_rows(rows, |row: &PgRow| BookRow::from_row(row))).await
}

/// Fetch a single book by its primary key.
pub async fn get_book(pool: &PgPool, id: i32) -> Result<BookRow, DbError> {
    let row = sqlx::query_as::<_, BookRow>(
        r#"
        SELECT id, title, author, isbn, year, price, created_at, updated_at
        FROM books
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Insert a new book. `id`, `created_at` and `updated_at` come from the
/// column defaults.
pub async fn create_book(pool: &PgPool, fields: BookFields<'_>) -> Result<BookRow, DbError> {
    let row = sqlx::query_as::<_, BookRow>(
        r#"
        INSERT INTO books (title, author, isbn, year, price)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, title, author, isbn, year, price, created_at, updated_at
        "#,
    )
    .bind(fields.title)
    .bind(fields.author)
    .bind(fields.isbn)
    .bind(fields.year)
    .bind(fields.price)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Replace every caller-writable column of a book and bump `updated_at`.
///
/// `updated_at` never moves backwards, even if the server clock does.
/// Returns `DbError::NotFound` if no row has that id.
pub async fn update_book(
    pool: &PgPool,
    id: i32,
    fields: BookFields<'_>,
) -> Result<BookRow, DbError> {
    let row = sqlx::query_as::<_, BookRow>(
        r#"
        UPDATE books
        SET title = $1, author = $2, isbn = $3, year = $4, price = $5,
            updated_at = GREATEST(NOW(), updated_at)
        WHERE id = $6
        RETURNING id, title, author, isbn, year, price, created_at, updated_at
        "#,
    )
    .bind(fields.title)
    .bind(fields.author)
    .bind(fields.isbn)
    .bind(fields.year)
    .bind(fields.price)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Permanently delete a book by its primary key.
///
/// Returns `DbError::NotFound` if no row was deleted.
pub async fn delete_book(pool: &PgPool, id: i32) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM books WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
