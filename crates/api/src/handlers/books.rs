use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use store::input::{decode_book_input, parse_id, parse_year_filter};
use store::{Book, StoreError};

use super::AppState;
use crate::ApiError;

/// Raw query string for list. `year` stays text until parsed.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub year: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let Query(query) = query.map_err(|e| StoreError::Validation(e.body_text()))?;
    let year = parse_year_filter(query.year.as_deref())?;
    let books = state.store.list(year).await?;
    Ok(Json(books))
}

pub async fn get(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Book>, ApiError> {
    let id = parse_id(&id)?;
    let book = state.store.get(id).await?;
    Ok(Json(book))
}

pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let input = decode_book_input(&body)?;
    let book = state.store.create(&input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn update(
    Path(id): Path<String>,
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Book>, ApiError> {
    let id = parse_id(&id)?;
    let input = decode_book_input(&body)?;
    let book = state.store.update(id, &input).await?;
    Ok(Json(book))
}

pub async fn delete(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    state.store.delete(id).await?;
    Ok(Json(json!({ "message": "book deleted successfully" })))
}
