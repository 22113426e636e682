//! Request, response and storage models.
//!
//! All models use serde for serialization/deserialization.
//! Storage models are stored as JSON values in Redis.

use crate::error::AppError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// French day names, Monday first (index = `day_of_week`).
pub const DAY_NAMES: [&str; 7] = [
    "Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi", "Dimanche",
];

/// Schedule place marking a closed day. Closed entries carry no times.
pub const CLOSED_PLACE: &str = "Fermé";

// ============================================================================
// Administrator
// ============================================================================

/// Administrator record as stored in Redis.
#[derive(Clone, Serialize, Deserialize)]
pub struct Administrator {
    pub id: u64,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
}

impl std::fmt::Debug for Administrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Administrator")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("is_active", &self.is_active)
            .finish()
    }
}

/// Login form (urlencoded or JSON).
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// ============================================================================
// Products
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    CrepesSucrees,
    CrepesSalees,
    Gaufres,
    Box,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 4] = [
        ProductCategory::CrepesSucrees,
        ProductCategory::CrepesSalees,
        ProductCategory::Gaufres,
        ProductCategory::Box,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::CrepesSucrees => "crepes_sucrees",
            ProductCategory::CrepesSalees => "crepes_salees",
            ProductCategory::Gaufres => "gaufres",
            ProductCategory::Box => "box",
        }
    }

    /// Display label shown on the website.
    pub fn label(&self) -> &'static str {
        match self {
            ProductCategory::CrepesSucrees => "Crêpes sucrées",
            ProductCategory::CrepesSalees => "Crêpes salées",
            ProductCategory::Gaufres => "Gaufres",
            ProductCategory::Box => "Box",
        }
    }

    /// Frontend filter tag.
    pub fn tag(&self) -> &'static str {
        match self {
            ProductCategory::CrepesSucrees | ProductCategory::Gaufres => "sweet",
            ProductCategory::CrepesSalees | ProductCategory::Box => "savory",
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProductCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Invalid category: {}", s))
    }
}

/// Product as stored in Redis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub category: ProductCategory,
    pub price: f64,
    pub image_filename: Option<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub is_best_seller: bool,
    pub display_order: i32,
}

/// Admin create/update payload for a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub category: ProductCategory,
    pub price: f64,
    #[serde(default)]
    pub image_filename: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_best_seller: bool,
    #[serde(default)]
    pub display_order: i32,
}

impl ProductInput {
    pub fn validate(&self) -> Result<(), AppError> {
        let name_len = self.name.trim().chars().count();
        if !(1..=100).contains(&name_len) {
            return Err(AppError::BadRequest(
                "Name must be 1-100 characters".to_string(),
            ));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(AppError::BadRequest(
                "Price must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the stored record, mapping empty optional text to `None`.
    pub fn into_product(self, id: u64) -> Product {
        Product {
            id,
            name: self.name.trim().to_string(),
            category: self.category,
            price: self.price,
            image_filename: non_empty(self.image_filename),
            description: non_empty(self.description),
            is_active: self.is_active,
            is_best_seller: self.is_best_seller,
            display_order: self.display_order,
        }
    }
}

/// Product shape consumed by the public frontend.
#[derive(Debug, Serialize)]
pub struct ApiProduct {
    pub id: u64,
    pub name: String,
    pub category: ProductCategory,
    pub category_label: &'static str,
    pub price: f64,
    pub image: String,
    pub alt: String,
    pub tags: Vec<&'static str>,
    pub bestseller: bool,
}

impl From<Product> for ApiProduct {
    fn from(product: Product) -> Self {
        let image = product
            .image_filename
            .as_deref()
            .map(|file| format!("assets/img/{}", file))
            .unwrap_or_default();
        let alt = product
            .description
            .clone()
            .unwrap_or_else(|| product.name.clone());
        ApiProduct {
            id: product.id,
            category_label: product.category.label(),
            tags: vec![product.category.tag()],
            name: product.name,
            category: product.category,
            price: product.price,
            image,
            alt,
            bestseller: product.is_best_seller,
        }
    }
}

// ============================================================================
// Schedule
// ============================================================================

/// Weekly schedule entry as stored in Redis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: u64,
    /// 0 = Monday ... 6 = Sunday
    pub day_of_week: u8,
    pub place: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_active: bool,
}

/// Admin create/update payload for a schedule entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleInput {
    pub day_of_week: u8,
    pub place: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl ScheduleInput {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.day_of_week > 6 {
            return Err(AppError::BadRequest(
                "day_of_week must be between 0 and 6".to_string(),
            ));
        }
        let place_len = self.place.trim().chars().count();
        if !(1..=200).contains(&place_len) {
            return Err(AppError::BadRequest(
                "Place must be 1-200 characters".to_string(),
            ));
        }
        for time in [&self.start_time, &self.end_time].into_iter().flatten() {
            if !time.is_empty() && !is_valid_time(time) {
                return Err(AppError::BadRequest(format!(
                    "Invalid time '{}', expected HH:MM",
                    time
                )));
            }
        }
        Ok(())
    }

    /// Build the stored record. Closed days drop their times.
    pub fn into_entry(self, id: u64) -> ScheduleEntry {
        let place = self.place.trim().to_string();
        let closed = place == CLOSED_PLACE;
        ScheduleEntry {
            id,
            day_of_week: self.day_of_week,
            start_time: if closed { None } else { non_empty(self.start_time) },
            end_time: if closed { None } else { non_empty(self.end_time) },
            place,
            is_active: self.is_active,
        }
    }
}

/// One display row of the public weekly schedule.
#[derive(Debug, Serialize, PartialEq)]
pub struct ApiScheduleRow {
    pub day: &'static str,
    pub day_index: u8,
    pub place: String,
    pub hours: String,
    pub is_weekend: bool,
}

// ============================================================================
// Location & Settings (singletons)
// ============================================================================

/// Today's location and optional daily message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    pub today_location: Option<String>,
    pub today_hours: Option<String>,
    pub daily_message: Option<String>,
}

impl Location {
    /// Map empty strings to `None`, as submitted by blank form fields.
    pub fn normalized(self) -> Self {
        Location {
            today_location: non_empty(self.today_location),
            today_hours: non_empty(self.today_hours),
            daily_message: non_empty(self.daily_message),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiLocation {
    pub place: String,
    pub hours: String,
    pub message: Option<String>,
}

impl From<Option<Location>> for ApiLocation {
    fn from(location: Option<Location>) -> Self {
        let location = location.unwrap_or_default();
        ApiLocation {
            place: location
                .today_location
                .unwrap_or_else(|| "Emplacement non defini".to_string()),
            hours: location.today_hours.unwrap_or_default(),
            message: location.daily_message,
        }
    }
}

/// Site-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub hours_weekday: String,
    pub hours_evening: String,
    pub hours_weekend: String,
    pub instagram_url: String,
    pub tiktok_url: String,
    pub site_name: String,
    pub slogan: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            hours_weekday: "11h30 - 14h00".to_string(),
            hours_evening: "18h00 - 21h00".to_string(),
            hours_weekend: "09h00 - 15h00".to_string(),
            instagram_url: "https://instagram.com".to_string(),
            tiktok_url: "https://tiktok.com".to_string(),
            site_name: "KIOSQUE DU PARC".to_string(),
            slogan: "Du sucré, du salé, fait minute.".to_string(),
        }
    }
}

/// Partial settings update. Missing or blank fields keep the stored value.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsUpdate {
    pub hours_weekday: Option<String>,
    pub hours_evening: Option<String>,
    pub hours_weekend: Option<String>,
    pub instagram_url: Option<String>,
    pub tiktok_url: Option<String>,
    pub site_name: Option<String>,
    pub slogan: Option<String>,
}

impl Settings {
    pub fn apply(&mut self, update: SettingsUpdate) {
        let fields = [
            (&mut self.hours_weekday, update.hours_weekday),
            (&mut self.hours_evening, update.hours_evening),
            (&mut self.hours_weekend, update.hours_weekend),
            (&mut self.instagram_url, update.instagram_url),
            (&mut self.tiktok_url, update.tiktok_url),
            (&mut self.site_name, update.site_name),
            (&mut self.slogan, update.slogan),
        ];
        for (field, value) in fields {
            if let Some(value) = non_empty(value) {
                *field = value;
            }
        }
    }
}

// ============================================================================
// Contact messages
// ============================================================================

/// Contact message as stored in Redis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    pub created_at: u64,
    pub is_read: bool,
}

/// Public contact form submission.
#[derive(Debug, Deserialize)]
pub struct ContactInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

impl ContactInput {
    pub fn validate(&self) -> Result<(), AppError> {
        check_len("name", &self.name, 2, 100)?;
        if !is_valid_email(&self.email) {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
        if let Some(phone) = &self.phone {
            if phone.chars().count() > 20 {
                return Err(AppError::BadRequest(
                    "phone must be at most 20 characters".to_string(),
                ));
            }
        }
        check_len("subject", &self.subject, 5, 200)?;
        check_len("message", &self.message, 10, 2000)?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct ContactAck {
    pub success: bool,
    pub message: &'static str,
}

// ============================================================================
// Admin dashboard
// ============================================================================

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_products: usize,
    pub active_products: usize,
    pub bestsellers: usize,
    pub schedules_count: usize,
    pub unread_messages: usize,
    pub total_messages: usize,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub admin: String,
    pub stats: DashboardStats,
    pub location: Option<Location>,
}

// ============================================================================
// Helpers
// ============================================================================

fn default_true() -> bool {
    true
}

/// Seconds since the Unix epoch (0 if the clock is before it).
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Trim and map empty text to `None`.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Compiled once at first use. `None` would reject every value.
static TIME_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[0-2][0-9]:[0-5][0-9]$").ok());

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").ok());

/// `HH:MM` as accepted by the schedule form.
pub fn is_valid_time(time: &str) -> bool {
    TIME_PATTERN.as_ref().is_some_and(|re| re.is_match(time))
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.as_ref().is_some_and(|re| re.is_match(email))
}

fn check_len(field: &str, value: &str, min: usize, max: usize) -> Result<(), AppError> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        return Err(AppError::BadRequest(format!(
            "{} must be {}-{} characters",
            field, min, max
        )));
    }
    Ok(())
}
