use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use store::{check_health, Health};

use super::AppState;

/// GET /health — 200 when the store answers a ping, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match check_health(state.store.as_ref()).await {
        Health::Healthy => (StatusCode::OK, Json(json!({ "message": "healthy" }))),
        Health::Unhealthy { error } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "message": "unhealthy", "error": error })),
        ),
    }
}
