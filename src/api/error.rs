//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::DatabaseError;
use crate::plans::PlanError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid Credentials")]
    InvalidCredentials,
    #[error("Username already taken: {0}")]
    DuplicateUsername(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Store failure: {0}")]
    Store(String),
    #[error("Plan service failure: {0}")]
    PlanService(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid Credentials".to_string(),
            ),
            ApiError::DuplicateUsername(username) => (
                StatusCode::CONFLICT,
                "DUPLICATE_USERNAME",
                format!("Username already taken: {username}"),
            ),
            ApiError::InvalidInput(detail) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", detail.clone())
            }
            ApiError::Store(detail) => {
                tracing::error!(detail, "store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_FAILURE",
                    "A storage error occurred".to_string(),
                )
            }
            ApiError::PlanService(detail) => {
                tracing::error!(detail, "plan generation failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "PLAN_SERVICE",
                    "Plan generation failed".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::DuplicateUsername { username } => ApiError::DuplicateUsername(username),
            other => ApiError::Store(other.to_string()),
        }
    }
}

impl From<PlanError> for ApiError {
    fn from(err: PlanError) -> Self {
        ApiError::PlanService(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[tokio::test]
    async fn invalid_credentials_returns_401() {
        let response = ApiError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "INVALID_CREDENTIALS");
        assert_eq!(json["error"]["message"], "Invalid Credentials");
    }

    #[tokio::test]
    async fn duplicate_username_returns_409() {
        let response = ApiError::DuplicateUsername("alice".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "DUPLICATE_USERNAME");
    }

    #[tokio::test]
    async fn invalid_input_returns_400() {
        let response = ApiError::InvalidInput("age must be numeric".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_failure_hides_details() {
        let response = ApiError::Store("disk on fire".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["message"], "A storage error occurred");
    }

    #[tokio::test]
    async fn plan_failure_returns_502() {
        let err: ApiError = PlanError::MissingContent.into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "PLAN_SERVICE");
    }

    #[tokio::test]
    async fn duplicate_username_maps_from_database_error() {
        let err: ApiError = DatabaseError::DuplicateUsername {
            username: "alice".into(),
        }
        .into();
        assert!(matches!(err, ApiError::DuplicateUsername(u) if u == "alice"));
    }
}
