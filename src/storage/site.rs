//! Singleton site content: today's location and site settings.
//!
//! Redis key patterns:
//! - `location` - today's location (JSON)
//! - `settings` - site settings (JSON)

use crate::models::{Location, Settings, SettingsUpdate};
use redis::AsyncCommands;

const LOCATION_KEY: &str = "location";
const SETTINGS_KEY: &str = "settings";

pub async fn get_location<C>(con: &mut C) -> Result<Option<Location>, redis::RedisError>
where
    C: AsyncCommands,
{
    super::get_json(con, LOCATION_KEY).await
}

/// Replace today's location. Blank fields are stored as unset.
pub async fn put_location<C>(con: &mut C, location: Location) -> Result<Location, redis::RedisError>
where
    C: AsyncCommands,
{
    let location = location.normalized();
    super::set_json(con, LOCATION_KEY, &location).await?;
    Ok(location)
}

/// Store `default` unless a location already exists. Returns the stored value.
pub async fn ensure_location<C>(con: &mut C, default: Location) -> Result<Location, redis::RedisError>
where
    C: AsyncCommands,
{
    let created: bool = con
        .set_nx(LOCATION_KEY, super::to_json(&default.normalized())?)
        .await?;
    if created {
        tracing::info!(action = "seed_location", "Default location stored");
    }
    Ok(get_location(con).await?.unwrap_or_default())
}

pub async fn get_settings<C>(con: &mut C) -> Result<Option<Settings>, redis::RedisError>
where
    C: AsyncCommands,
{
    super::get_json(con, SETTINGS_KEY).await
}

/// Apply a partial update on top of the stored (or default) settings.
pub async fn update_settings<C>(con: &mut C, update: SettingsUpdate) -> Result<Settings, redis::RedisError>
where
    C: AsyncCommands,
{
    let mut settings = get_settings(con).await?.unwrap_or_default();
    settings.apply(update);
    super::set_json(con, SETTINGS_KEY, &settings).await?;
    Ok(settings)
}

/// Store default settings unless settings already exist.
pub async fn ensure_settings<C>(con: &mut C) -> Result<Settings, redis::RedisError>
where
    C: AsyncCommands,
{
    let created: bool = con
        .set_nx(SETTINGS_KEY, super::to_json(&Settings::default())?)
        .await?;
    if created {
        tracing::info!(action = "seed_settings", "Default settings stored");
    }
    Ok(get_settings(con).await?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support;

    #[tokio::test]
    async fn test_ensure_location_does_not_overwrite() {
        let Some((mut con, _guard)) = test_support::redis().await else {
            return;
        };

        assert!(get_location(&mut con).await.unwrap().is_none());
        put_location(
            &mut con,
            Location {
                today_location: Some("Place du Marche".to_string()),
                today_hours: Some("".to_string()),
                daily_message: None,
            },
        )
        .await
        .unwrap();

        let kept = ensure_location(
            &mut con,
            Location {
                today_location: Some("Ailleurs".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(kept.today_location.as_deref(), Some("Place du Marche"));
        assert_eq!(kept.today_hours, None);
    }

    #[tokio::test]
    async fn test_settings_defaults_and_partial_update() {
        let Some((mut con, _guard)) = test_support::redis().await else {
            return;
        };

        let settings = ensure_settings(&mut con).await.unwrap();
        assert_eq!(settings, Settings::default());

        let updated = update_settings(
            &mut con,
            SettingsUpdate {
                slogan: Some("Crepes a toute heure".to_string()),
                site_name: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.slogan, "Crepes a toute heure");
        assert_eq!(updated.site_name, "KIOSQUE DU PARC");

        // A second ensure keeps the edit.
        assert_eq!(ensure_settings(&mut con).await.unwrap(), updated);
    }
}
