//! First-run seeding of an empty database.

use crate::{
    config::store::StoreConfig,
    core::{account, announcement, inventory, menu, settings, sync},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing::info;

/// What [`seed_initial_data`] created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub menu_items: usize,
    pub inventory_items: usize,
    pub accounts: usize,
    pub settings_created: bool,
    pub welcome_posted: bool,
    /// Drinks in the published customer menu after seeding
    pub published: usize,
}

/// Seeds whatever is missing and publishes the customer menu.
///
/// Each part is seeded only when its table (or settings key) is empty, so this
/// is safe to run on every start.
pub async fn seed_initial_data(db: &DatabaseConnection, config: &StoreConfig) -> Result<SeedReport> {
    let report = SeedReport {
        menu_items: menu::seed_default_menu(db, &config.menu).await?,
        inventory_items: inventory::seed_inventory(db, &config.inventory).await?,
        accounts: account::seed_default_accounts(db, &config.accounts).await?,
        settings_created: settings::seed_settings(db, &config.store).await?,
        welcome_posted: announcement::seed_welcome_announcement(db).await?,
        published: sync::sync_customer_menu(db, &config.menu).await?.published,
    };

    info!(
        "Startup data ready: {} drinks published ({} menu items, {} inventory items, {} accounts seeded)",
        report.published, report.menu_items, report.inventory_items, report.accounts
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::account::authenticate;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_seed_initial_data_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let config = StoreConfig::default();

        let first = seed_initial_data(&db, &config).await?;
        assert_eq!(first.menu_items, 12);
        assert_eq!(first.inventory_items, 5);
        assert_eq!(first.accounts, 3);
        assert!(first.settings_created);
        assert!(first.welcome_posted);
        assert_eq!(first.published, 12);

        let second = seed_initial_data(&db, &config).await?;
        assert_eq!(
            second,
            SeedReport {
                published: 12,
                ..SeedReport::default()
            }
        );

        assert!(authenticate(&db, "cashier1", "password").await.is_ok());
        Ok(())
    }
}
