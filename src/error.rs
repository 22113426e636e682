//! Error types and Axum response conversions.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application error types.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Internal(msg) => {
                // Log detailed error server-side, return generic message to client
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Internal(format!("Redis error: {}", err))
    }
}

impl From<crate::auth::AuthError> for AppError {
    fn from(err: crate::auth::AuthError) -> Self {
        use crate::auth::AuthError;
        match err {
            AuthError::InvalidCredentials => {
                AppError::Unauthorized("Identifiants invalides".to_string())
            }
            AuthError::Storage(msg) | AuthError::Internal(msg) => AppError::Internal(msg),
            AuthError::BadSignature
            | AuthError::Expired
            | AuthError::NotYetValid
            | AuthError::MissingSession => {
                AppError::Unauthorized("Not authenticated".to_string())
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    /// Extract status code and JSON body from an AppError response.
    async fn error_response(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        (status, json)
    }

    #[tokio::test]
    async fn test_internal_hides_details() {
        let (status, body) = error_response(AppError::Internal(
            "Redis connection refused at 10.0.0.5:6379".to_string(),
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert!(!body["error"].as_str().unwrap().contains("10.0.0.5"));
    }

    #[tokio::test]
    async fn test_client_errors_keep_message() {
        let (status, body) =
            error_response(AppError::BadRequest("Prix invalide".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Prix invalide");

        let (status, body) =
            error_response(AppError::Unauthorized("Not authenticated".to_string())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Not authenticated");

        let (status, _) =
            error_response(AppError::NotFound("Product not found".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            error_response(AppError::Conflict("Admin already exists".to_string())).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_from_redis_error() {
        let redis_err = redis::RedisError::from((
            redis::ErrorKind::UnexpectedReturnType,
            "test context",
            "connection refused".to_string(),
        ));
        match AppError::from(redis_err) {
            AppError::Internal(msg) => assert!(msg.contains("Redis error")),
            _ => panic!("Expected Internal variant"),
        }
    }

    #[tokio::test]
    async fn test_from_auth_error() {
        let (status, body) = error_response(crate::auth::AuthError::InvalidCredentials.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Identifiants invalides");

        let (status, _) =
            error_response(crate::auth::AuthError::Storage("down".to_string()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_from_serde_error() {
        let serde_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        match AppError::from(serde_err) {
            AppError::Internal(msg) => assert!(msg.contains("JSON error")),
            _ => panic!("Expected Internal variant"),
        }
    }
}
