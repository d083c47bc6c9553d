use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mollysou_database::StoreError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// JSON error body returned by every handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub status: String,
    pub code: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(status: impl Into<String>, code: u16, message: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", 400, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", 401, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", 404, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("conflict", 409, message)
    }

    pub fn internal() -> Self {
        Self::new("internal_error", 500, "Something went wrong.")
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::not_found(err.to_string()),
            StoreError::Rejected(message) => Self::bad_request(message),
            StoreError::Conflict(_)
            | StoreError::Unavailable(_)
            | StoreError::InsufficientStock { .. } => Self::conflict(err.to_string()),
            StoreError::StorageFailure(source) => {
                error!(error = ?source, "storage failure");
                Self::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        error!(error = ?err, "request failed");
        Self::internal()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_status_codes() {
        let not_found: ApiError = StoreError::user_not_found(4).into();
        assert_eq!(not_found.code, 404);
        assert_eq!(not_found.message, "user 4 not found");

        let conflict: ApiError = StoreError::InsufficientStock {
            product_id: 2,
            requested: 5,
            in_stock: 3,
        }
        .into();
        assert_eq!(conflict.code, 409);
        assert_eq!(conflict.status, "conflict");

        let failure: ApiError = StoreError::StorageFailure(anyhow::anyhow!("pool closed")).into();
        assert_eq!(failure.code, 500);
        assert!(!failure.message.contains("pool"));
    }

    #[test]
    fn rejected_update_is_a_bad_request() {
        let err: ApiError = StoreError::Rejected("points below zero".into()).into();
        assert_eq!(err.code, 400);
        assert_eq!(err.message, "points below zero");
    }

    #[test]
    fn response_uses_error_code() {
        let response = ApiError::bad_request("nope").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
