//! HTTP route handlers.

pub mod admin;
pub mod api;
pub mod auth;

use crate::auth::middleware::AppState;
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

/// Build the router with the public API, the admin surface and `/health`.
pub fn app_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(api_router())
        .merge(admin_router())
}

/// Public endpoints read by the website.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(api::list_products))
        .route("/api/products/best-sellers", get(api::best_sellers))
        .route("/api/location/today", get(api::location_today))
        .route("/api/schedule", get(api::schedule))
        .route("/api/settings", get(api::settings))
        .route("/api/contact", post(api::submit_contact))
}

/// Login/logout plus the session-protected management API.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        // Session endpoints
        .route("/admin/login", get(auth::login_status).post(auth::login))
        .route("/admin/login/status", get(auth::login_status))
        .route("/admin/logout", get(auth::logout).post(auth::logout))
        // Protected endpoints
        .route("/admin", get(admin::dashboard))
        .route("/admin/api/dashboard", get(admin::dashboard))
        .route(
            "/admin/api/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route(
            "/admin/api/products/{id}",
            get(admin::get_product)
                .put(admin::update_product)
                .delete(admin::delete_product),
        )
        .route(
            "/admin/api/schedule",
            get(admin::list_schedule).post(admin::create_schedule),
        )
        .route(
            "/admin/api/schedule/{id}",
            get(admin::get_schedule)
                .put(admin::update_schedule)
                .delete(admin::delete_schedule),
        )
        .route(
            "/admin/api/location",
            get(admin::get_location).put(admin::update_location),
        )
        .route(
            "/admin/api/settings",
            get(admin::get_settings).put(admin::update_settings),
        )
        .route("/admin/api/messages", get(admin::list_messages))
        .route(
            "/admin/api/messages/{id}",
            get(admin::read_message).delete(admin::delete_message),
        )
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({"status": "ok", "app": "KIOSQUE DU PARC"}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{
            header::{ACCEPT, COOKIE, LOCATION, SET_COOKIE},
            Request, StatusCode,
        },
    };
    use std::path::PathBuf;
    use tower::ServiceExt;

    // Opening a client does not connect, so routes that never reach Redis
    // can be exercised without a server.
    fn state() -> AppState {
        let config = Config {
            redis_url: "redis://127.0.0.1:1".to_string(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            static_dir: PathBuf::from("static"),
            secret_key: "router-test-secret-0123456789abcdef".to_string(),
            session_max_age_secs: 3_600,
            cookie_secure: false,
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
            seed_demo_data: false,
        };
        let client = redis::Client::open(config.redis_url.as_str()).unwrap();
        AppState::new(client, config)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app_router().with_state(state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["app"], "KIOSQUE DU PARC");
    }

    #[tokio::test]
    async fn test_protected_route_rejects_api_client() {
        let app = app_router().with_state(state());
        let response = app
            .oneshot(
                Request::get("/admin/api/products")
                    .header(ACCEPT, "application/json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Not authenticated");
    }

    #[tokio::test]
    async fn test_protected_route_redirects_browser() {
        let app = app_router().with_state(state());
        let response = app
            .oneshot(
                Request::get("/admin")
                    .header(ACCEPT, "text/html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/admin/login");
    }

    #[tokio::test]
    async fn test_forged_cookie_rejected() {
        let app = app_router().with_state(state());
        let response = app
            .oneshot(
                Request::delete("/admin/api/messages/1")
                    .header(COOKIE, "kdp_admin_session=eyJhZG1pbl9pZCI6MX0.AAAA")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie_without_session() {
        let app = app_router().with_state(state());
        let response = app
            .oneshot(
                Request::post("/admin/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/admin/login");
        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("kdp_admin_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_login_status_with_valid_session() {
        let state = state();
        let token = state.auth.codec().issue(4, "alice").unwrap();
        let app = app_router().with_state(state);

        let response = app
            .oneshot(
                Request::get("/admin/login/status")
                    .header(COOKIE, format!("kdp_admin_session={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["username"], "alice");
    }

    #[tokio::test]
    async fn test_login_status_anonymous() {
        let app = app_router().with_state(state());
        let response = app
            .oneshot(
                Request::get("/admin/login/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["authenticated"], false);
        assert!(body["username"].is_null());
    }

    #[tokio::test]
    async fn test_malformed_login_body_is_bad_request() {
        let app = app_router().with_state(state());
        let response = app
            .oneshot(
                Request::post("/admin/login")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"username\": 1}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
