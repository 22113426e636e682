//! Admin login, logout and session status.

use crate::auth::middleware::{AppState, LOGIN_PATH};
use crate::error::AppError;
use crate::models::LoginRequest;
use axum::{
    extract::{FromRequest, Request, State},
    http::{
        header::{CONTENT_TYPE, LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::IntoResponse,
    Form, Json,
};
use serde::Serialize;
use zeroize::Zeroizing;

/// Where a successful login lands.
const ADMIN_HOME: &str = "/admin";

/// Login credentials from either a urlencoded form or a JSON body.
pub struct LoginPayload(pub LoginRequest);

impl<S> FromRequest<S> for LoginPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let body = if is_json {
            Json::<LoginRequest>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?
                .0
        } else {
            Form::<LoginRequest>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?
                .0
        };
        Ok(LoginPayload(body))
    }
}

#[derive(Debug, Serialize)]
pub struct LoginStatus {
    pub authenticated: bool,
    pub username: Option<String>,
}

/// POST /admin/login - Verify credentials and set the session cookie
pub async fn login(
    State(state): State<AppState>,
    LoginPayload(req): LoginPayload,
) -> Result<impl IntoResponse, AppError> {
    let password = Zeroizing::new(req.password);
    let mut con = state.connection().await?;

    let session = state
        .auth
        .login(&mut con, &req.username, &password)
        .await?;

    Ok((
        StatusCode::SEE_OTHER,
        [
            (LOCATION, HeaderValue::from_static(ADMIN_HOME)),
            (SET_COOKIE, session.set_cookie),
        ],
    ))
}

/// GET /admin/login/status - Whether the caller holds a valid session
pub async fn login_status(State(state): State<AppState>, headers: HeaderMap) -> Json<LoginStatus> {
    match state.auth.authorize(&headers) {
        Ok(identity) => Json(LoginStatus {
            authenticated: true,
            username: Some(identity.username),
        }),
        Err(_) => Json(LoginStatus {
            authenticated: false,
            username: None,
        }),
    }
}

/// GET|POST /admin/logout - Clear the session cookie
///
/// Always succeeds, with or without a session.
pub async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let cleared = state.auth.logout()?;
    tracing::info!(action = "logout", "Admin session cleared");
    Ok((
        StatusCode::SEE_OTHER,
        [
            (LOCATION, HeaderValue::from_static(LOGIN_PATH)),
            (SET_COOKIE, cleared.set_cookie),
        ],
    ))
}
