//! Shared test utilities for `CaneBar`.
//!
//! Helpers for setting up in-memory databases and building test inputs with
//! sensible defaults.

use crate::{
    config::store::StoreConfig,
    core::{account::Registration, bootstrap, cart::Cart, menu::MenuItemInput, sync},
    entities::{DrinkSize, Special},
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// In-memory database seeded with the built-in store configuration: the
/// twelve default drinks (published), tracked inventory, the three seed
/// accounts, settings (8.5% tax) and the welcome announcement.
pub async fn seeded_test_db() -> Result<DatabaseConnection> {
    let db = setup_test_db().await?;
    bootstrap::seed_initial_data(&db, &StoreConfig::default()).await?;
    Ok(db)
}

/// Menu input with an empty description and no image.
#[must_use]
pub fn drink_input(name: &str, price_regular: f64, price_tall: f64) -> MenuItemInput {
    MenuItemInput {
        name: name.to_string(),
        description: String::new(),
        price_regular,
        price_tall,
        image: None,
    }
}

/// Registration with `secret1` as password and the username as display name.
#[must_use]
pub fn registration(username: &str, email: &str) -> Registration {
    Registration {
        name: username.to_string(),
        username: username.to_string(),
        email: email.to_string(),
        password: "secret1".to_string(),
        confirm_password: "secret1".to_string(),
    }
}

/// Builds a cart from published drinks, looked up by exact name.
///
/// # Arguments
/// * `db` - Database with a published customer menu
/// * `lines` - `(name, size, special, quantity)` per line
pub async fn cart_with(
    db: &DatabaseConnection,
    lines: &[(&str, DrinkSize, Special, u32)],
) -> Result<Cart> {
    let menu = sync::get_customer_menu(db).await?;
    let mut cart = Cart::new();
    for (name, size, special, quantity) in lines {
        let entry = menu
            .iter()
            .find(|entry| entry.name == *name)
            .ok_or_else(|| Error::MenuItemNotFound {
                name: (*name).to_string(),
            })?;
        cart.add(entry, *size, *special, "", *quantity)?;
    }
    Ok(cart)
}
