//! Inventory business logic - cup stock for tracked drinks.
//!
//! Names are matched case-insensitively. Drinks without an inventory row are
//! untracked and never block an order.

use crate::{
    config::store::InventoryConfig,
    entities::{InventoryItem, inventory_item, order_item},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::BTreeMap;
use tracing::info;

/// Stock at or below this count is reported as low.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

/// All tracked drinks, alphabetically.
pub async fn get_inventory<C>(db: &C) -> Result<Vec<inventory_item::Model>>
where
    C: ConnectionTrait,
{
    InventoryItem::find()
        .order_by_asc(inventory_item::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn find_item<C>(db: &C, name: &str) -> Result<Option<inventory_item::Model>>
where
    C: ConnectionTrait,
{
    let wanted = name.trim().to_lowercase();
    Ok(get_inventory(db)
        .await?
        .into_iter()
        .find(|item| item.name.to_lowercase() == wanted))
}

fn validate_quantity(quantity: i32) -> Result<()> {
    if quantity <= 0 {
        return Err(Error::InvalidQuantity {
            quantity: i64::from(quantity),
        });
    }
    Ok(())
}

/// Adds stock to a drink, starting to track it if it was untracked.
pub async fn stock_in(
    db: &DatabaseConnection,
    name: &str,
    quantity: i32,
) -> Result<inventory_item::Model> {
    validate_quantity(quantity)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Inventory item name cannot be empty"));
    }
    let now = chrono::Utc::now().naive_utc();

    let item = if let Some(existing) = find_item(db, name).await? {
        let stock = existing.stock.checked_add(quantity).ok_or_else(|| {
            Error::validation(format!("Stock for {} would overflow", existing.name))
        })?;
        let mut active: inventory_item::ActiveModel = existing.into();
        active.stock = Set(stock);
        active.updated_at = Set(now);
        active.update(db).await?
    } else {
        inventory_item::ActiveModel {
            name: Set(name.to_string()),
            stock: Set(quantity),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?
    };

    info!("Stock in: {} +{} (now {})", item.name, quantity, item.stock);
    Ok(item)
}

/// Removes stock from a tracked drink. Stock never goes below zero.
///
/// # Errors
/// Returns an error if the drink is untracked or has fewer units than requested.
pub async fn stock_out(
    db: &DatabaseConnection,
    name: &str,
    quantity: i32,
) -> Result<inventory_item::Model> {
    validate_quantity(quantity)?;

    let existing = find_item(db, name)
        .await?
        .ok_or_else(|| Error::validation(format!("{} is not tracked in inventory", name.trim())))?;
    if existing.stock < quantity {
        return Err(Error::InsufficientStock {
            name: existing.name,
            requested: i64::from(quantity),
            available: existing.stock,
        });
    }

    let stock = existing.stock - quantity;
    let mut active: inventory_item::ActiveModel = existing.into();
    active.stock = Set(stock);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    let item = active.update(db).await?;

    info!("Stock out: {} -{} (now {})", item.name, quantity, item.stock);
    Ok(item)
}

/// Tracked drinks with stock at or below `threshold`.
pub async fn get_low_stock(
    db: &DatabaseConnection,
    threshold: i32,
) -> Result<Vec<inventory_item::Model>> {
    InventoryItem::find()
        .filter(inventory_item::Column::Stock.lte(threshold))
        .order_by_asc(inventory_item::Column::Stock)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deducts the cups of an order from tracked stock.
///
/// Quantities of the same drink across lines are added up first. Nothing is
/// written unless every tracked drink has enough stock; callers run this
/// inside the approval transaction.
pub async fn deduct_for_items<C>(db: &C, items: &[order_item::Model]) -> Result<()>
where
    C: ConnectionTrait,
{
    // Several large lines of one drink can exceed i32.
    let mut needed: BTreeMap<String, i64> = BTreeMap::new();
    for item in items {
        *needed.entry(item.name.to_lowercase()).or_default() += i64::from(item.quantity);
    }

    let tracked: BTreeMap<String, inventory_item::Model> = get_inventory(db)
        .await?
        .into_iter()
        .map(|item| (item.name.to_lowercase(), item))
        .collect();

    let mut updates = Vec::new();
    for (name, quantity) in &needed {
        let Some(item) = tracked.get(name) else {
            continue;
        };
        let remaining = match i32::try_from(i64::from(item.stock) - quantity) {
            Ok(remaining) if remaining >= 0 => remaining,
            _ => {
                return Err(Error::InsufficientStock {
                    name: item.name.clone(),
                    requested: *quantity,
                    available: item.stock,
                });
            }
        };
        updates.push((item.clone(), remaining));
    }

    let now = chrono::Utc::now().naive_utc();
    for (item, stock) in updates {
        let mut active: inventory_item::ActiveModel = item.into();
        active.stock = Set(stock);
        active.updated_at = Set(now);
        active.update(db).await?;
    }

    Ok(())
}

/// Fills an empty inventory table from config.toml. Returns the rows added.
pub async fn seed_inventory(db: &DatabaseConnection, defaults: &[InventoryConfig]) -> Result<usize> {
    if InventoryItem::find().count(db).await? > 0 {
        return Ok(0);
    }

    let now = chrono::Utc::now().naive_utc();
    let txn = db.begin().await?;
    for entry in defaults {
        inventory_item::ActiveModel {
            name: Set(entry.name.clone()),
            stock: Set(entry.stock.max(0)),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    info!("Seeded {} inventory items", defaults.len());
    Ok(defaults.len())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::store::StoreConfig;
    use crate::entities::{DrinkSize, Special};
    use crate::test_utils::setup_test_db;

    fn line(name: &str, quantity: i32) -> order_item::Model {
        order_item::Model {
            id: 0,
            order_id: "ORD-001".to_string(),
            menu_item_id: None,
            name: name.to_string(),
            size: DrinkSize::Regular,
            special: Special::None,
            notes: String::new(),
            quantity,
            unit_price: 79.0,
        }
    }

    #[tokio::test]
    async fn test_seed_inventory_only_when_empty() -> Result<()> {
        let db = setup_test_db().await?;
        let defaults = StoreConfig::default().inventory;

        assert_eq!(seed_inventory(&db, &defaults).await?, 5);
        assert_eq!(seed_inventory(&db, &defaults).await?, 0);

        let inventory = get_inventory(&db).await?;
        assert_eq!(inventory.len(), 5);
        assert_eq!(inventory[0].name, "Calamansi Cane");
        Ok(())
    }

    #[tokio::test]
    async fn test_stock_in_and_out() -> Result<()> {
        let db = setup_test_db().await?;
        seed_inventory(&db, &StoreConfig::default().inventory).await?;

        let item = stock_in(&db, "yakult cane", 12).await?;
        assert_eq!(item.stock, 40);

        let item = stock_out(&db, "Yakult Cane", 40).await?;
        assert_eq!(item.stock, 0);

        let result = stock_out(&db, "Yakult Cane", 1).await;
        assert!(matches!(
            result,
            Err(Error::InsufficientStock {
                requested: 1,
                available: 0,
                ..
            })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_stock_in_starts_tracking() -> Result<()> {
        let db = setup_test_db().await?;
        let item = stock_in(&db, "Mint Cane", 8).await?;
        assert_eq!(item.stock, 8);

        let result = stock_out(&db, "Ginger Cane", 1).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = stock_in(&db, "Mint Cane", 0).await;
        assert!(matches!(result, Err(Error::InvalidQuantity { quantity: 0 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_low_stock() -> Result<()> {
        let db = setup_test_db().await?;
        seed_inventory(&db, &StoreConfig::default().inventory).await?;
        stock_out(&db, "Lemon Cane", 40).await?;

        let low = get_low_stock(&db, DEFAULT_LOW_STOCK_THRESHOLD).await?;
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Lemon Cane");
        assert_eq!(low[0].stock, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_deduct_for_items_is_all_or_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        seed_inventory(&db, &StoreConfig::default().inventory).await?;

        deduct_for_items(
            &db,
            &[
                line("Pure Sugarcane", 3),
                line("pure sugarcane", 2),
                line("Mint Cane", 100),
            ],
        )
        .await?;
        let pure = find_item(&db, "Pure Sugarcane").await?.unwrap();
        assert_eq!(pure.stock, 45);

        let result = deduct_for_items(&db, &[line("Lemon Cane", 1), line("Yakult Cane", 29)]).await;
        assert!(matches!(result, Err(Error::InsufficientStock { .. })));
        let lemon = find_item(&db, "Lemon Cane").await?.unwrap();
        assert_eq!(lemon.stock, 45);
        Ok(())
    }

    #[tokio::test]
    async fn test_deduct_for_items_sums_large_lines_without_wrapping() -> Result<()> {
        let db = setup_test_db().await?;
        seed_inventory(&db, &StoreConfig::default().inventory).await?;

        let result = deduct_for_items(
            &db,
            &[line("Lemon Cane", 2_000_000_000), line("lemon cane", 2_000_000_000)],
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::InsufficientStock {
                requested: 4_000_000_000,
                available: 45,
                ..
            })
        ));
        let lemon = find_item(&db, "Lemon Cane").await?.unwrap();
        assert_eq!(lemon.stock, 45);
        Ok(())
    }
}
