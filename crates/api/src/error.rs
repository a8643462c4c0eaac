//! Mapping of store failures onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use store::{ErrorKind, StoreError};
use thiserror::Error;
use uuid::Uuid;

/// Error returned by every handler.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] StoreError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Backend => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Startup => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.0.kind().code();

        if status.is_server_error() {
            let error_id = Uuid::new_v4();
            tracing::error!(
                error_id = %error_id,
                error_code = code,
                status_code = status.as_u16(),
                error = %self.0,
                "request failed"
            );
        } else {
            tracing::debug!(error_code = code, error = %self.0, "request rejected");
        }

        let body = json!({
            "error": self.0.to_string(),
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_404() {
        let err = ApiError::from(StoreError::NotFound { id: 3 });
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_is_400() {
        let err = ApiError::from(StoreError::Validation("invalid book id 'x'".into()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn backend_is_500() {
        let err = ApiError::from(StoreError::Backend("connection reset".into()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn startup_is_503() {
        let err = ApiError::from(StoreError::Startup("refused".into()));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
