//! Menu business logic - the admin-maintained drink catalog.
//!
//! Items are never removed from the table: deleting one sets `is_deleted`, so
//! the menu sync can tell a deleted default drink apart from one that was
//! never edited.

use crate::{
    config::store::{DEFAULT_IMAGE, MenuItemConfig},
    entities::{MenuItem, menu_item},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Fields an admin provides when creating or editing a drink
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItemInput {
    pub name: String,
    pub description: String,
    pub price_regular: f64,
    pub price_tall: f64,
    /// Image reference; `None` keeps the current image (or the placeholder)
    pub image: Option<String>,
}

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(Error::InvalidPrice { amount: price });
    }
    Ok(())
}

fn validate_input(input: &MenuItemInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("Menu item name cannot be empty"));
    }
    validate_price(input.price_regular)?;
    validate_price(input.price_tall)
}

/// Retrieves all active (non-deleted) menu items, ordered by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_all_active_menu_items(db: &DatabaseConnection) -> Result<Vec<menu_item::Model>> {
    MenuItem::find()
        .filter(menu_item::Column::IsDeleted.eq(false))
        .order_by_asc(menu_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an active menu item by id.
pub async fn get_menu_item_by_id(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<menu_item::Model>> {
    MenuItem::find_by_id(id)
        .filter(menu_item::Column::IsDeleted.eq(false))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an active menu item by name, ignoring case and surrounding spaces.
pub async fn get_menu_item_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<menu_item::Model>> {
    let wanted = name.trim().to_lowercase();
    Ok(get_all_active_menu_items(db)
        .await?
        .into_iter()
        .find(|item| item.name.to_lowercase() == wanted))
}

/// Next free menu id: one past the highest id ever used, deleted items included.
pub(crate) async fn next_menu_id<C>(db: &C) -> Result<i64>
where
    C: ConnectionTrait,
{
    let last = MenuItem::find()
        .order_by_desc(menu_item::Column::Id)
        .one(db)
        .await?;
    Ok(last.map_or(1, |item| item.id + 1))
}

/// Creates a new drink after validating the name and both prices.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or whitespace-only
/// - Either price is zero, negative or not finite
/// - The database insert operation fails
pub async fn create_menu_item(
    db: &DatabaseConnection,
    input: MenuItemInput,
) -> Result<menu_item::Model> {
    validate_input(&input)?;

    let txn = db.begin().await?;
    let id = next_menu_id(&txn).await?;
    let now = chrono::Utc::now().naive_utc();

    let item = menu_item::ActiveModel {
        id: Set(id),
        name: Set(input.name.trim().to_string()),
        description: Set(input.description.trim().to_string()),
        price_regular: Set(input.price_regular),
        price_tall: Set(input.price_tall),
        image: Set(input.image.unwrap_or_else(|| DEFAULT_IMAGE.to_string())),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!("Created menu item {} ({})", item.name, item.id);
    Ok(item)
}

/// Updates an existing drink, keeping its id.
///
/// # Errors
/// Returns an error if validation fails or the item does not exist (or is deleted).
pub async fn update_menu_item(
    db: &DatabaseConnection,
    id: i64,
    input: MenuItemInput,
) -> Result<menu_item::Model> {
    validate_input(&input)?;

    let existing = get_menu_item_by_id(db, id)
        .await?
        .ok_or_else(|| Error::MenuItemNotFound {
            name: id.to_string(),
        })?;

    let mut item: menu_item::ActiveModel = existing.into();
    item.name = Set(input.name.trim().to_string());
    item.description = Set(input.description.trim().to_string());
    item.price_regular = Set(input.price_regular);
    item.price_tall = Set(input.price_tall);
    if let Some(image) = input.image {
        item.image = Set(image);
    }
    item.updated_at = Set(chrono::Utc::now().naive_utc());

    let updated = item.update(db).await?;
    info!("Updated menu item {} ({})", updated.name, updated.id);
    Ok(updated)
}

/// Soft-deletes a drink so it disappears from the menu on the next sync.
pub async fn delete_menu_item(db: &DatabaseConnection, id: i64) -> Result<menu_item::Model> {
    let existing = get_menu_item_by_id(db, id)
        .await?
        .ok_or_else(|| Error::MenuItemNotFound {
            name: id.to_string(),
        })?;

    let mut item: menu_item::ActiveModel = existing.into();
    item.is_deleted = Set(true);
    item.updated_at = Set(chrono::Utc::now().naive_utc());

    let deleted = item.update(db).await?;
    info!("Deleted menu item {} ({})", deleted.name, deleted.id);
    Ok(deleted)
}

/// Fills an empty menu table with the canonical drinks.
///
/// Entries without an id are numbered by their position (1-based). Returns
/// the number of items inserted, which is 0 when the table already has rows.
pub async fn seed_default_menu(db: &DatabaseConnection, defaults: &[MenuItemConfig]) -> Result<usize> {
    if MenuItem::find().count(db).await? > 0 {
        return Ok(0);
    }

    let now = chrono::Utc::now().naive_utc();
    let txn = db.begin().await?;
    for (index, entry) in defaults.iter().enumerate() {
        let position = i64::try_from(index)? + 1;
        menu_item::ActiveModel {
            id: Set(entry.id.unwrap_or(position)),
            name: Set(entry.name.clone()),
            description: Set(entry.description.clone()),
            price_regular: Set(entry.price_regular),
            price_tall: Set(entry.price_tall),
            image: Set(entry
                .image
                .clone()
                .unwrap_or_else(|| DEFAULT_IMAGE.to_string())),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;
    }
    txn.commit().await?;

    info!("Seeded {} default menu items", defaults.len());
    Ok(defaults.len())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::config::store::StoreConfig;
    use crate::entities::DrinkSize;
    use crate::test_utils::{drink_input, setup_test_db};
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_menu_item_assigns_next_id() -> Result<()> {
        let db = setup_test_db().await?;
        let first = create_menu_item(&db, drink_input("Mint Cane", 95.0, 125.0)).await?;
        let second = create_menu_item(&db, drink_input("Ginger Cane", 95.0, 125.0)).await?;

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.image, DEFAULT_IMAGE);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_menu_item_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_menu_item(&db, drink_input("   ", 95.0, 125.0)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_menu_item(&db, drink_input("Mint Cane", 0.0, 125.0)).await;
        assert!(matches!(result, Err(Error::InvalidPrice { .. })));

        let result = create_menu_item(&db, drink_input("Mint Cane", 95.0, f64::NAN)).await;
        assert!(matches!(result, Err(Error::InvalidPrice { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_keeps_id_and_image() -> Result<()> {
        let db = setup_test_db().await?;
        let mut input = drink_input("Mint Cane", 95.0, 125.0);
        input.image = Some("images/mint.png".to_string());
        let created = create_menu_item(&db, input).await?;

        let updated =
            update_menu_item(&db, created.id, drink_input("Mint Cane Deluxe", 99.0, 129.0)).await?;
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Mint Cane Deluxe");
        assert_eq!(updated.price_tall, 129.0);
        assert_eq!(updated.image, "images/mint.png");
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_is_soft_and_ids_are_not_reused() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_menu_item(&db, drink_input("Mint Cane", 95.0, 125.0)).await?;
        delete_menu_item(&db, created.id).await?;

        assert!(get_menu_item_by_id(&db, created.id).await?.is_none());
        assert!(get_all_active_menu_items(&db).await?.is_empty());
        assert!(MenuItem::find_by_id(created.id).one(&db).await?.is_some());

        let result = update_menu_item(&db, created.id, drink_input("Mint", 1.0, 2.0)).await;
        assert!(matches!(result, Err(Error::MenuItemNotFound { .. })));

        let next = create_menu_item(&db, drink_input("Ginger Cane", 95.0, 125.0)).await?;
        assert_eq!(next.id, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_lookup_by_name_ignores_case() -> Result<()> {
        let db = setup_test_db().await?;
        create_menu_item(&db, drink_input("Lemon Cane", 89.0, 119.0)).await?;

        let found = get_menu_item_by_name(&db, "  lemon CANE").await?.unwrap();
        assert_eq!(found.name, "Lemon Cane");
        assert!(get_menu_item_by_name(&db, "Lime Cane").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_default_menu_only_when_empty() -> Result<()> {
        let db = setup_test_db().await?;
        let defaults = StoreConfig::default().menu;

        assert_eq!(seed_default_menu(&db, &defaults).await?, 12);
        assert_eq!(seed_default_menu(&db, &defaults).await?, 0);

        let items = get_all_active_menu_items(&db).await?;
        assert_eq!(items.len(), 12);
        assert_eq!(items[0].name, "Pure Sugarcane");
        assert_eq!(items[0].price_for(DrinkSize::Tall), 109.0);
        Ok(())
    }

    #[test]
    fn test_price_for_falls_back_to_regular() {
        let now = chrono::Utc::now().naive_utc();
        let item = menu_item::Model {
            id: 1,
            name: "Pure Sugarcane".to_string(),
            description: String::new(),
            price_regular: 79.0,
            price_tall: 0.0,
            image: DEFAULT_IMAGE.to_string(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(item.price_for(DrinkSize::Regular), 79.0);
        assert_eq!(item.price_for(DrinkSize::Tall), 79.0);
    }
}
