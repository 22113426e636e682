//! First-run bootstrap: demo catalogue, singleton rows and the default
//! administrator.

use crate::auth::{hash_password, PasswordError};
use crate::config::Config;
use crate::models::{Location, ProductCategory, ProductInput, ScheduleInput};
use crate::storage;
use redis::AsyncCommands;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Administrator '{0}' already exists")]
    AdminExists(String),

    #[error("Administrator '{0}' not found")]
    AdminNotFound(String),
}

/// Password that triggers a warning when used for the default admin.
const FACTORY_PASSWORD: &str = "admin123";

// (name, category, price, image, description, best seller)
const DEMO_PRODUCTS: [(&str, ProductCategory, f64, &str, &str, bool); 10] = [
    ("Crepe au miel", ProductCategory::CrepesSucrees, 3.50, "Crêpe_miel.jpeg", "Crepe nappee de miel dore", true),
    ("Crepe caramel", ProductCategory::CrepesSucrees, 3.50, "Crêpe_caramel.jpeg", "Crepe au caramel onctueux", true),
    ("Crepe chocolat + banane", ProductCategory::CrepesSucrees, 4.90, "Crêpe_chocolat_banane.jpeg", "Crepe chocolat avec banane fraiche", true),
    ("Crepe chocolat + coco rapee", ProductCategory::CrepesSucrees, 4.90, "Crêpe_chocolat_coco_râpée.jpeg", "Crepe chocolat avec coco rapee", false),
    ("Crepe chocolat", ProductCategory::CrepesSucrees, 3.90, "Crêpe_chocolat.jpeg", "Crepe au chocolat fondant", false),
    ("Crepe salee jambon-fromage", ProductCategory::CrepesSalees, 5.50, "crêpe salée_jambon-fromage.jpeg", "Crepe salee jambon et fromage fondu", false),
    ("Crepe salee poulet pane + fromage", ProductCategory::CrepesSalees, 6.50, "crêpe_salée_pouletpané_fromage.jpeg", "Crepe salee poulet pane croustillant avec fromage", true),
    ("Gaufre chocolat + eclats", ProductCategory::Gaufres, 4.50, "Gaufre_chocolat_éclats.jpeg", "Gaufre chocolat avec eclats croustillants", true),
    ("Gaufre nature + sucre glace", ProductCategory::Gaufres, 3.50, "Gaufre nature_sucre_glace.jpeg", "Gaufre nature saupoudree de sucre glace", false),
    ("Riz Crousty", ProductCategory::Box, 7.90, "Riz_Crousty.jpeg", "Box Riz Crousty genereux", true),
];

// (day, place, start, end)
const DEMO_SCHEDULE: [(u8, &str, &str, &str); 9] = [
    (0, "Marche du Centre", "10:00", "14:00"),
    (1, "Place de la Gare", "11:30", "14:00"),
    (1, "Place de la Gare", "18:00", "20:30"),
    (2, "Parc des Expositions", "11:00", "15:00"),
    (3, "Campus Universitaire", "11:30", "14:30"),
    (4, "Zone Commerciale Nord", "11:30", "14:00"),
    (4, "Zone Commerciale Nord", "18:00", "21:00"),
    (5, "Marche couvert", "09:00", "15:00"),
    (6, "Parc de la Mairie", "10:00", "14:00"),
];

fn default_location() -> Location {
    Location {
        today_location: Some("Parc de la Mairie - Centre-ville".to_string()),
        today_hours: Some("11h30 - 14h00 / 18h00 - 21h00".to_string()),
        daily_message: None,
    }
}

/// Run every startup step. Safe to call on each boot: nothing already
/// present is overwritten.
pub async fn bootstrap<C>(con: &mut C, config: &Config) -> Result<(), SeedError>
where
    C: AsyncCommands,
{
    if config.seed_demo_data {
        seed_demo_data(con).await?;
    }
    storage::site::ensure_settings(con).await?;
    storage::site::ensure_location(con, default_location()).await?;
    ensure_default_admin(con, &config.admin_username, &config.admin_password).await?;
    Ok(())
}

/// Insert the demo products and schedule into empty collections.
pub async fn seed_demo_data<C>(con: &mut C) -> Result<(), SeedError>
where
    C: AsyncCommands,
{
    if storage::product::count_products(con).await? == 0 {
        for (order, (name, category, price, image, description, best_seller)) in
            DEMO_PRODUCTS.into_iter().enumerate()
        {
            let input = ProductInput {
                name: name.to_string(),
                category,
                price,
                image_filename: Some(image.to_string()),
                description: Some(description.to_string()),
                is_active: true,
                is_best_seller: best_seller,
                display_order: order as i32 + 1,
            };
            storage::product::create_product(con, input).await?;
        }
        tracing::info!(action = "seed_products", count = DEMO_PRODUCTS.len(), "Demo products created");
    }

    if storage::schedule::count_entries(con).await? == 0 {
        for (day, place, start, end) in DEMO_SCHEDULE {
            let input = ScheduleInput {
                day_of_week: day,
                place: place.to_string(),
                start_time: Some(start.to_string()),
                end_time: Some(end.to_string()),
                is_active: true,
            };
            storage::schedule::create_entry(con, input).await?;
        }
        tracing::info!(action = "seed_schedule", count = DEMO_SCHEDULE.len(), "Demo schedule created");
    }

    Ok(())
}

/// Create the configured administrator when no administrator exists yet.
pub async fn ensure_default_admin<C>(con: &mut C, username: &str, password: &str) -> Result<(), SeedError>
where
    C: AsyncCommands,
{
    if storage::admin::count_admins(con).await? > 0 {
        return Ok(());
    }

    create_admin(con, username, password).await?;
    if password == FACTORY_PASSWORD {
        tracing::warn!(
            username = %username,
            "Default admin uses the factory password; change ADMIN_PASS and recreate the account"
        );
    }
    Ok(())
}

/// Provision an administrator, refusing an existing username.
pub async fn create_admin<C>(con: &mut C, username: &str, password: &str) -> Result<u64, SeedError>
where
    C: AsyncCommands,
{
    let hash = hash_password(password)?;
    let admin = storage::admin::create_admin(con, username, &hash)
        .await?
        .ok_or_else(|| SeedError::AdminExists(username.to_string()))?;
    tracing::info!(action = "admin_created", admin_id = admin.id, username = %admin.username, "Administrator created");
    Ok(admin.id)
}

/// Enable or disable an administrator by username. Disabled administrators
/// cannot log in; sessions they already hold stay valid until they expire.
pub async fn set_admin_active<C>(con: &mut C, username: &str, is_active: bool) -> Result<(), SeedError>
where
    C: AsyncCommands,
{
    let admin = storage::admin::get_admin_by_username(con, username)
        .await?
        .ok_or_else(|| SeedError::AdminNotFound(username.to_string()))?;
    storage::admin::set_admin_active(con, admin.id, is_active).await?;
    tracing::info!(action = "admin_status_changed", admin_id = admin.id, is_active, "Administrator status changed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::storage::test_support;

    #[test]
    fn test_demo_schedule_entries_are_valid() {
        for (day, place, start, end) in DEMO_SCHEDULE {
            let input = ScheduleInput {
                day_of_week: day,
                place: place.to_string(),
                start_time: Some(start.to_string()),
                end_time: Some(end.to_string()),
                is_active: true,
            };
            assert!(input.validate().is_ok(), "{} {}", day, place);
        }
    }

    #[test]
    fn test_demo_products_are_valid() {
        for (name, category, price, _, _, _) in DEMO_PRODUCTS {
            let input = ProductInput {
                name: name.to_string(),
                category,
                price,
                image_filename: None,
                description: None,
                is_active: true,
                is_best_seller: false,
                display_order: 0,
            };
            assert!(input.validate().is_ok(), "{}", name);
        }
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let Some((mut con, _guard)) = test_support::redis().await else {
            return;
        };

        seed_demo_data(&mut con).await.unwrap();
        seed_demo_data(&mut con).await.unwrap();

        assert_eq!(
            storage::product::count_products(&mut con).await.unwrap(),
            DEMO_PRODUCTS.len()
        );
        assert_eq!(
            storage::schedule::count_entries(&mut con).await.unwrap(),
            DEMO_SCHEDULE.len()
        );
    }

    #[tokio::test]
    async fn test_default_admin_created_once() {
        let Some((mut con, _guard)) = test_support::redis().await else {
            return;
        };

        ensure_default_admin(&mut con, "admin", "first-pass").await.unwrap();
        ensure_default_admin(&mut con, "other", "second-pass").await.unwrap();

        assert_eq!(storage::admin::count_admins(&mut con).await.unwrap(), 1);
        let admin = storage::admin::get_admin_by_username(&mut con, "admin")
            .await
            .unwrap()
            .unwrap();
        assert!(verify_password("first-pass", &admin.password_hash));
    }

    #[tokio::test]
    async fn test_create_admin_refuses_duplicate() {
        let Some((mut con, _guard)) = test_support::redis().await else {
            return;
        };

        create_admin(&mut con, "alice", "S3cret!").await.unwrap();
        let err = create_admin(&mut con, "alice", "other").await.unwrap_err();
        assert!(matches!(err, SeedError::AdminExists(ref u) if u == "alice"));
    }

    #[tokio::test]
    async fn test_disable_admin_by_username() {
        let Some((mut con, _guard)) = test_support::redis().await else {
            return;
        };

        create_admin(&mut con, "bob", "hunter2").await.unwrap();
        set_admin_active(&mut con, "bob", false).await.unwrap();
        let bob = storage::admin::get_admin_by_username(&mut con, "bob")
            .await
            .unwrap()
            .unwrap();
        assert!(!bob.is_active);

        let err = set_admin_active(&mut con, "nobody", true).await.unwrap_err();
        assert!(matches!(err, SeedError::AdminNotFound(_)));
    }
}
