//! Store settings - business name, currency, tax rate and notification flags.
//!
//! Settings are kept as one JSON document in the `system_state` table. The
//! key/value helpers used for that are shared with the menu sync and sales
//! modules, which keep their own snapshots next to it.

use crate::{
    config::store::StoreSection,
    entities::{SystemState, system_state},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const SETTINGS_KEY: &str = "settings";

/// General storefront settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub business_name: String,
    /// ISO currency code
    pub default_currency: String,
    /// Tax in percent, 0 to 100
    pub tax_rate: f64,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        let store = StoreSection::default();
        Self {
            business_name: store.business_name,
            default_currency: store.currency,
            tax_rate: store.tax_rate,
        }
    }
}

/// Which notifications the admin wants. Only stored; nothing is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub low_stock: bool,
    pub new_order: bool,
    pub daily_sales_report: bool,
    pub notification_email: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            low_stock: false,
            new_order: false,
            daily_sales_report: false,
            notification_email: "admin@jessiecane.com".to_string(),
        }
    }
}

/// The full settings document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub notifications: NotificationSettings,
}

impl Settings {
    /// Builds settings from the `[store]` table of config.toml.
    #[must_use]
    pub fn from_store(store: &StoreSection) -> Self {
        Self {
            general: GeneralSettings {
                business_name: store.business_name.clone(),
                default_currency: store.currency.clone(),
                tax_rate: store.tax_rate,
            },
            notifications: NotificationSettings::default(),
        }
    }

    /// Tax rate as a fraction (8.5% becomes 0.085).
    #[must_use]
    pub fn tax_fraction(&self) -> f64 {
        self.general.tax_rate / 100.0
    }
}

/// Reads a raw value from the `system_state` table.
pub(crate) async fn read_state<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let state = SystemState::find()
        .filter(system_state::Column::Key.eq(key))
        .one(db)
        .await?;
    Ok(state.map(|s| s.value))
}

/// Inserts or replaces a raw value in the `system_state` table.
pub(crate) async fn write_state<C>(db: &C, key: &str, value: String) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now().naive_utc();

    let existing = SystemState::find()
        .filter(system_state::Column::Key.eq(key))
        .one(db)
        .await?;

    if let Some(state) = existing {
        let mut active_model: system_state::ActiveModel = state.into();
        active_model.value = Set(value);
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let new_state = system_state::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(now),
            ..Default::default()
        };
        new_state.insert(db).await?;
    }

    Ok(())
}

/// Current settings. Missing settings yield the defaults; a corrupt document
/// is logged and also replaced by the defaults.
pub async fn get_settings<C>(db: &C) -> Result<Settings>
where
    C: ConnectionTrait,
{
    let Some(raw) = read_state(db, SETTINGS_KEY).await? else {
        return Ok(Settings::default());
    };

    match serde_json::from_str(&raw) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            warn!("Stored settings are corrupt, using defaults: {}", e);
            Ok(Settings::default())
        }
    }
}

async fn store_settings<C>(db: &C, settings: &Settings) -> Result<()>
where
    C: ConnectionTrait,
{
    write_state(db, SETTINGS_KEY, serde_json::to_string(settings)?).await
}

/// Replaces the general section after validating it.
///
/// # Errors
/// Returns an error if:
/// - The business name or currency is blank
/// - The tax rate is not a number between 0 and 100
pub async fn save_general(db: &DatabaseConnection, general: GeneralSettings) -> Result<Settings> {
    let business_name = general.business_name.trim().to_string();
    if business_name.is_empty() {
        return Err(Error::validation("Business name cannot be empty"));
    }
    let default_currency = general.default_currency.trim().to_uppercase();
    if default_currency.is_empty() {
        return Err(Error::validation("Currency cannot be empty"));
    }
    if !general.tax_rate.is_finite() || !(0.0..=100.0).contains(&general.tax_rate) {
        return Err(Error::validation(format!(
            "Tax rate must be between 0 and 100, got {}",
            general.tax_rate
        )));
    }

    let mut settings = get_settings(db).await?;
    settings.general = GeneralSettings {
        business_name,
        default_currency,
        tax_rate: general.tax_rate,
    };
    store_settings(db, &settings).await?;

    info!(
        "Saved general settings: {} ({}, {}% tax)",
        settings.general.business_name,
        settings.general.default_currency,
        settings.general.tax_rate
    );
    Ok(settings)
}

/// Replaces the notification section.
pub async fn save_notifications(
    db: &DatabaseConnection,
    notifications: NotificationSettings,
) -> Result<Settings> {
    let email = notifications.notification_email.trim().to_string();
    if !email.is_empty() && !email.contains('@') {
        return Err(Error::validation(format!(
            "Invalid notification email: {email}"
        )));
    }

    let mut settings = get_settings(db).await?;
    settings.notifications = NotificationSettings {
        notification_email: email,
        ..notifications
    };
    store_settings(db, &settings).await?;

    info!("Saved notification settings");
    Ok(settings)
}

/// Writes settings built from config.toml unless settings already exist.
///
/// Returns `true` when the settings were created.
pub async fn seed_settings(db: &DatabaseConnection, store: &StoreSection) -> Result<bool> {
    if read_state(db, SETTINGS_KEY).await?.is_some() {
        return Ok(false);
    }

    store_settings(db, &Settings::from_store(store)).await?;
    info!("Seeded settings for {}", store.business_name);
    Ok(true)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_get_settings_defaults_when_absent() -> Result<()> {
        let db = setup_test_db().await?;
        let settings = get_settings(&db).await?;

        assert_eq!(settings.general.business_name, "Jessie Cane Juicebar");
        assert_eq!(settings.general.default_currency, "PHP");
        assert_eq!(settings.general.tax_rate, 8.5);
        assert!(!settings.notifications.low_stock);
        assert_eq!(
            settings.notifications.notification_email,
            "admin@jessiecane.com"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_save_general_round_trips() -> Result<()> {
        let db = setup_test_db().await?;
        save_general(
            &db,
            GeneralSettings {
                business_name: "  Cane Corner ".to_string(),
                default_currency: "usd".to_string(),
                tax_rate: 12.0,
            },
        )
        .await?;

        let settings = get_settings(&db).await?;
        assert_eq!(settings.general.business_name, "Cane Corner");
        assert_eq!(settings.general.default_currency, "USD");
        assert!((settings.tax_fraction() - 0.12).abs() < f64::EPSILON);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_general_rejects_bad_tax_rate() -> Result<()> {
        let db = setup_test_db().await?;
        let result = save_general(
            &db,
            GeneralSettings {
                tax_rate: 150.0,
                ..GeneralSettings::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = save_general(
            &db,
            GeneralSettings {
                business_name: "   ".to_string(),
                ..GeneralSettings::default()
            },
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_save_notifications_keeps_general() -> Result<()> {
        let db = setup_test_db().await?;
        seed_settings(&db, &StoreSection::default()).await?;

        save_notifications(
            &db,
            NotificationSettings {
                low_stock: true,
                new_order: true,
                daily_sales_report: false,
                notification_email: "owner@example.com".to_string(),
            },
        )
        .await?;

        let settings = get_settings(&db).await?;
        assert!(settings.notifications.low_stock);
        assert_eq!(settings.notifications.notification_email, "owner@example.com");
        assert_eq!(settings.general.business_name, "Jessie Cane Juicebar");

        let bad = save_notifications(
            &db,
            NotificationSettings {
                notification_email: "not-an-email".to_string(),
                ..NotificationSettings::default()
            },
        )
        .await;
        assert!(bad.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_settings_fall_back_to_defaults() -> Result<()> {
        let db = setup_test_db().await?;
        write_state(&db, SETTINGS_KEY, "{not json".to_string()).await?;

        let settings = get_settings(&db).await?;
        assert_eq!(settings, Settings::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_settings_only_once() -> Result<()> {
        let db = setup_test_db().await?;
        let store = StoreSection {
            business_name: "First".to_string(),
            currency: "PHP".to_string(),
            tax_rate: 10.0,
        };
        assert!(seed_settings(&db, &store).await?);

        let other = StoreSection {
            business_name: "Second".to_string(),
            ..store
        };
        assert!(!seed_settings(&db, &other).await?);
        assert_eq!(get_settings(&db).await?.general.business_name, "First");
        Ok(())
    }
}
