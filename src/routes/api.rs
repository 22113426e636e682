//! Public JSON endpoints consumed by the website.

use crate::auth::middleware::AppState;
use crate::error::AppError;
use crate::models::{
    ApiLocation, ApiProduct, ApiScheduleRow, ContactAck, ContactInput, ProductCategory,
    ScheduleEntry, DAY_NAMES,
};
use crate::storage::{self, product::ProductFilter};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

/// GET /api/products - Active products, optionally filtered
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, AppError> {
    let category = match query.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<ProductCategory>() {
            Ok(category) => Some(category),
            // Unknown categories match nothing.
            Err(_) => return Ok(Json(Vec::<ApiProduct>::new())),
        },
    };

    let filter = ProductFilter {
        category,
        search: query.search,
        active_only: true,
        best_sellers_only: false,
    };
    let mut con = state.connection().await?;
    let products = storage::product::list_products(&mut con, &filter).await?;

    Ok(Json(
        products
            .into_iter()
            .map(ApiProduct::from)
            .collect::<Vec<_>>(),
    ))
}

/// GET /api/products/best-sellers
pub async fn best_sellers(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let filter = ProductFilter {
        active_only: true,
        best_sellers_only: true,
        ..Default::default()
    };
    let mut con = state.connection().await?;
    let products = storage::product::list_products(&mut con, &filter).await?;

    Ok(Json(
        products
            .into_iter()
            .map(ApiProduct::from)
            .collect::<Vec<_>>(),
    ))
}

/// GET /api/location/today
pub async fn location_today(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut con = state.connection().await?;
    let location = storage::site::get_location(&mut con).await?;
    Ok(Json(ApiLocation::from(location)))
}

/// GET /api/schedule - Weekly schedule grouped for display
pub async fn schedule(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut con = state.connection().await?;
    let entries = storage::schedule::list_entries(&mut con, true).await?;
    Ok(Json(group_schedule(entries)))
}

/// GET /api/settings - Stored settings, or defaults when never saved
pub async fn settings(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut con = state.connection().await?;
    let settings = storage::site::get_settings(&mut con)
        .await?
        .unwrap_or_default();
    Ok(Json(settings))
}

/// POST /api/contact - Store a contact form submission
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(input): Json<ContactInput>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;

    let mut con = state.connection().await?;
    let message = storage::message::create_message(&mut con, input).await?;

    tracing::info!(action = "contact_received", message_id = message.id, "Contact message stored");

    Ok(Json(ContactAck {
        success: true,
        message: "Message envoye avec succes",
    }))
}

/// Collapse entries into display rows.
///
/// `entries` must be ordered by (day, start time). Entries sharing a day and
/// place become one row whose hour ranges are joined with ` / `; an entry
/// without both times shows `-` and never adds a second row for the same
/// day and place.
pub fn group_schedule(entries: Vec<ScheduleEntry>) -> Vec<ApiScheduleRow> {
    let mut rows: Vec<ApiScheduleRow> = Vec::new();

    for entry in entries {
        let hours = match (&entry.start_time, &entry.end_time) {
            (Some(start), Some(end)) => Some(format!("{} - {}", start, end)),
            _ => None,
        };

        let existing = rows
            .iter_mut()
            .find(|row| row.day_index == entry.day_of_week && row.place == entry.place);

        match (existing, hours) {
            (Some(row), Some(hours)) if row.hours == "-" => row.hours = hours,
            (Some(row), Some(hours)) => {
                row.hours.push_str(" / ");
                row.hours.push_str(&hours);
            }
            (Some(_), None) => {}
            (None, hours) => rows.push(ApiScheduleRow {
                day: DAY_NAMES
                    .get(usize::from(entry.day_of_week))
                    .copied()
                    .unwrap_or(""),
                day_index: entry.day_of_week,
                place: entry.place,
                hours: hours.unwrap_or_else(|| "-".to_string()),
                is_weekend: entry.day_of_week >= 5,
            }),
        }
    }

    rows.sort_by_key(|row| row.day_index);
    rows
}
