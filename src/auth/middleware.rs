//! Axum state and the admin session extractor.

use super::guard::{AdminIdentity, Authenticator};
use crate::config::Config;
use crate::error::AppError;
use axum::{
    extract::FromRequestParts,
    http::{header::ACCEPT, request::Parts, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use redis::aio::MultiplexedConnection;
use std::sync::Arc;

/// Where unauthenticated browsers are sent.
pub const LOGIN_PATH: &str = "/admin/login";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub redis: redis::Client,
    pub config: Arc<Config>,
    pub auth: Arc<Authenticator>,
}

impl AppState {
    pub fn new(redis: redis::Client, config: Config) -> Self {
        let auth = Authenticator::from_config(&config);
        Self {
            redis,
            config: Arc::new(config),
            auth: Arc::new(auth),
        }
    }

    pub async fn connection(&self) -> Result<MultiplexedConnection, AppError> {
        self.redis
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection error: {}", e)))
    }
}

/// Authenticated administrator, extracted from the session cookie.
///
/// Rejects with a redirect to the login page for browser navigation and with
/// 401 for API callers.
pub struct AdminSession(pub AdminIdentity);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AdminRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .auth
            .authorize(&parts.headers)
            .map(AdminSession)
            .map_err(|_| AdminRejection::for_request(&parts.headers))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminRejection {
    RedirectToLogin,
    Unauthorized,
}

impl AdminRejection {
    fn for_request(headers: &HeaderMap) -> Self {
        let wants_html = headers
            .get(ACCEPT)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|accept| accept.contains("text/html"));
        if wants_html {
            AdminRejection::RedirectToLogin
        } else {
            AdminRejection::Unauthorized
        }
    }
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            AdminRejection::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            AdminRejection::Unauthorized => {
                AppError::Unauthorized("Not authenticated".to_string()).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::LOCATION, HeaderValue, StatusCode};

    #[test]
    fn test_browser_gets_redirect() {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9"),
        );
        let rejection = AdminRejection::for_request(&headers);
        assert_eq!(rejection, AdminRejection::RedirectToLogin);

        let response = rejection.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), LOGIN_PATH);
    }

    #[test]
    fn test_api_client_gets_401() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        assert_eq!(
            AdminRejection::for_request(&headers).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AdminRejection::for_request(&HeaderMap::new()),
            AdminRejection::Unauthorized
        );
    }
}
