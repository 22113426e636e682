//! Admin API endpoints (all require AdminSession).

use crate::auth::middleware::{AdminSession, AppState};
use crate::error::AppError;
use crate::models::{
    DashboardResponse, DashboardStats, Location, ProductInput, ScheduleInput, SettingsUpdate,
};
use crate::storage::{self, product::ProductFilter};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

/// GET /admin/api/dashboard - Counters and today's location
pub async fn dashboard(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = state.connection().await?;

    let products = storage::product::list_products(&mut con, &ProductFilter::default()).await?;
    let schedules = storage::schedule::list_entries(&mut con, true).await?;
    let messages = storage::message::list_messages(&mut con, false).await?;
    let location = storage::site::get_location(&mut con).await?;

    let stats = DashboardStats {
        total_products: products.len(),
        active_products: products.iter().filter(|p| p.is_active).count(),
        bestsellers: products
            .iter()
            .filter(|p| p.is_active && p.is_best_seller)
            .count(),
        schedules_count: schedules.len(),
        unread_messages: messages.iter().filter(|m| !m.is_read).count(),
        total_messages: messages.len(),
    };

    Ok(Json(DashboardResponse {
        admin: admin.username,
        stats,
        location,
    }))
}

// ============================================================================
// Products
// ============================================================================

/// GET /admin/api/products - All products, including inactive ones
pub async fn list_products(
    AdminSession(_admin): AdminSession,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = state.connection().await?;
    let products = storage::product::list_products(&mut con, &ProductFilter::default()).await?;
    Ok(Json(products))
}

/// POST /admin/api/products
pub async fn create_product(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;

    let mut con = state.connection().await?;
    let product = storage::product::create_product(&mut con, input).await?;

    tracing::info!(action = "product_created", product_id = product.id, admin = %admin.username, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /admin/api/products/{id}
pub async fn get_product(
    AdminSession(_admin): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = state.connection().await?;
    let product = storage::product::get_product(&mut con, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(Json(product))
}

/// PUT /admin/api/products/{id}
pub async fn update_product(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<ProductInput>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;

    let mut con = state.connection().await?;
    let product = storage::product::update_product(&mut con, id, input)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    tracing::info!(action = "product_updated", product_id = id, admin = %admin.username, "Product updated");

    Ok(Json(product))
}

/// DELETE /admin/api/products/{id}
pub async fn delete_product(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = state.connection().await?;
    if !storage::product::delete_product(&mut con, id).await? {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    tracing::warn!(action = "product_deleted", product_id = id, admin = %admin.username, "Product deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Schedule
// ============================================================================

/// GET /admin/api/schedule - All entries, including inactive ones
pub async fn list_schedule(
    AdminSession(_admin): AdminSession,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = state.connection().await?;
    let entries = storage::schedule::list_entries(&mut con, false).await?;
    Ok(Json(entries))
}

/// POST /admin/api/schedule
pub async fn create_schedule(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Json(input): Json<ScheduleInput>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;

    let mut con = state.connection().await?;
    let entry = storage::schedule::create_entry(&mut con, input).await?;

    tracing::info!(action = "schedule_created", schedule_id = entry.id, admin = %admin.username, "Schedule entry created");

    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /admin/api/schedule/{id}
pub async fn get_schedule(
    AdminSession(_admin): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = state.connection().await?;
    let entry = storage::schedule::get_entry(&mut con, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Schedule entry not found".to_string()))?;
    Ok(Json(entry))
}

/// PUT /admin/api/schedule/{id}
pub async fn update_schedule(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<ScheduleInput>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;

    let mut con = state.connection().await?;
    let entry = storage::schedule::update_entry(&mut con, id, input)
        .await?
        .ok_or_else(|| AppError::NotFound("Schedule entry not found".to_string()))?;

    tracing::info!(action = "schedule_updated", schedule_id = id, admin = %admin.username, "Schedule entry updated");

    Ok(Json(entry))
}

/// DELETE /admin/api/schedule/{id}
pub async fn delete_schedule(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = state.connection().await?;
    if !storage::schedule::delete_entry(&mut con, id).await? {
        return Err(AppError::NotFound("Schedule entry not found".to_string()));
    }

    tracing::warn!(action = "schedule_deleted", schedule_id = id, admin = %admin.username, "Schedule entry deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Location & settings
// ============================================================================

/// GET /admin/api/location
pub async fn get_location(
    AdminSession(_admin): AdminSession,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = state.connection().await?;
    let location = storage::site::get_location(&mut con)
        .await?
        .unwrap_or_default();
    Ok(Json(location))
}

/// PUT /admin/api/location
pub async fn update_location(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Json(location): Json<Location>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = state.connection().await?;
    let location = storage::site::put_location(&mut con, location).await?;

    tracing::info!(action = "location_updated", admin = %admin.username, "Location updated");

    Ok(Json(location))
}

/// GET /admin/api/settings
pub async fn get_settings(
    AdminSession(_admin): AdminSession,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = state.connection().await?;
    let settings = storage::site::get_settings(&mut con)
        .await?
        .unwrap_or_default();
    Ok(Json(settings))
}

/// PUT /admin/api/settings - Partial update, blank fields are ignored
pub async fn update_settings(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = state.connection().await?;
    let settings = storage::site::update_settings(&mut con, update).await?;

    tracing::info!(action = "settings_updated", admin = %admin.username, "Settings updated");

    Ok(Json(settings))
}

// ============================================================================
// Contact messages
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    #[serde(default)]
    pub unread_only: bool,
}

/// GET /admin/api/messages - Newest first
pub async fn list_messages(
    AdminSession(_admin): AdminSession,
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = state.connection().await?;
    let messages = storage::message::list_messages(&mut con, query.unread_only).await?;
    Ok(Json(messages))
}

/// GET /admin/api/messages/{id} - Opening a message marks it read
pub async fn read_message(
    AdminSession(_admin): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = state.connection().await?;
    let message = storage::message::mark_read(&mut con, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;
    Ok(Json(message))
}

/// DELETE /admin/api/messages/{id}
pub async fn delete_message(
    AdminSession(admin): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    let mut con = state.connection().await?;
    if !storage::message::delete_message(&mut con, id).await? {
        return Err(AppError::NotFound("Message not found".to_string()));
    }

    tracing::info!(action = "message_deleted", message_id = id, admin = %admin.username, "Message deleted");

    Ok(StatusCode::NO_CONTENT)
}
