//! Menu sync - reconciles the admin catalog with the published customer menu.
//!
//! The canonical drink list from config.toml is the base. Every stored menu
//! record is laid over it: records with an id replace the entry with that id
//! (or are appended under it), records without one replace the entry with the
//! same name, live entries before deleted ones (or are appended with the next
//! free id). The merged list is written back to `menu_items` and its active
//! entries are published as the customer menu snapshot.
//!
//! Older menu exports used `priceSmall/priceMedium/priceLarge`; those are
//! folded into the two current tiers by [`MenuRecord::from_legacy`].

use crate::{
    config::store::{DEFAULT_IMAGE, MenuItemConfig},
    core::settings::{read_state, write_state},
    entities::{DrinkSize, MenuItem, menu_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

const CUSTOMER_MENU_KEY: &str = "customer_menu";

/// A menu record normalized from the database or from a legacy export
#[derive(Debug, Clone, PartialEq)]
pub struct MenuRecord {
    /// `None` for records that never had an id
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub price_regular: f64,
    pub price_tall: f64,
    pub image: String,
    /// Tombstone flag; the entry stays merged but unpublished
    pub is_deleted: bool,
}

/// One row of the merged menu
#[derive(Debug, Clone, PartialEq)]
pub struct MergedEntry {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price_regular: f64,
    pub price_tall: f64,
    pub image: String,
    pub is_deleted: bool,
}

/// A drink as customers see it in the published menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_regular: f64,
    pub price_tall: f64,
    #[serde(default)]
    pub image: String,
}

impl CatalogEntry {
    /// Unit price for the requested size. Tall falls back to regular when unset.
    #[must_use]
    pub fn price_for(&self, size: DrinkSize) -> f64 {
        match size {
            DrinkSize::Tall if self.price_tall > 0.0 => self.price_tall,
            DrinkSize::Regular | DrinkSize::Tall => self.price_regular,
        }
    }
}

/// Outcome of a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Entries in the merged menu, tombstones included
    pub total: usize,
    /// Entries published to customers
    pub published: usize,
    /// Rows added to `menu_items`
    pub inserted: usize,
    /// Rows in `menu_items` whose content changed
    pub updated: usize,
}

fn value_str(v: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(s) = v.get(*key).and_then(Value::as_str) {
            let trimmed = s.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// First positive price among `keys`. Numeric strings count; zero and
/// unparseable values are treated as missing.
fn value_price(v: &Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        let parsed = match v.get(*key) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        if let Some(price) = parsed.filter(|p| p.is_finite() && *p > 0.0) {
            return Some(price);
        }
    }
    None
}

fn value_id(v: &Value) -> Option<i64> {
    let id = match v.get("id") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    id.filter(|id| *id > 0)
}

fn value_bool(v: &Value, keys: &[&str]) -> bool {
    keys.iter()
        .any(|key| v.get(*key).and_then(Value::as_bool).unwrap_or(false))
}

impl MenuRecord {
    /// Normalizes one entry of a legacy menu export.
    ///
    /// Regular price comes from `priceRegular`, then `priceSmall`. Tall price
    /// comes from `priceTall`, then `priceMedium`, then `priceLarge`, and
    /// finally the regular price.
    #[must_use]
    pub fn from_legacy(value: &Value) -> Self {
        let price_regular =
            value_price(value, &["priceRegular", "price_regular", "priceSmall"]).unwrap_or(0.0);
        let price_tall = value_price(
            value,
            &["priceTall", "price_tall", "priceMedium", "priceLarge"],
        )
        .unwrap_or(price_regular);

        Self {
            id: value_id(value),
            name: value_str(value, &["name"]).unwrap_or_else(|| "Unnamed".to_string()),
            description: value_str(value, &["description", "desc"]).unwrap_or_default(),
            price_regular,
            price_tall,
            image: value_str(value, &["image", "img"])
                .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            is_deleted: value_bool(value, &["isDeleted", "is_deleted", "deleted"]),
        }
    }
}

impl From<&menu_item::Model> for MenuRecord {
    fn from(item: &menu_item::Model) -> Self {
        Self {
            id: Some(item.id),
            name: item.name.clone(),
            description: item.description.clone(),
            price_regular: item.price_regular,
            price_tall: item.price_tall,
            image: item.image.clone(),
            is_deleted: item.is_deleted,
        }
    }
}

impl MergedEntry {
    fn overlay(&mut self, record: &MenuRecord) {
        self.name.clone_from(&record.name);
        self.description.clone_from(&record.description);
        self.price_regular = record.price_regular;
        self.price_tall = record.price_tall;
        self.image.clone_from(&record.image);
        self.is_deleted = record.is_deleted;
    }

    fn from_record(id: i64, record: &MenuRecord) -> Self {
        Self {
            id,
            name: record.name.clone(),
            description: record.description.clone(),
            price_regular: record.price_regular,
            price_tall: record.price_tall,
            image: record.image.clone(),
            is_deleted: record.is_deleted,
        }
    }

    fn to_catalog(&self) -> CatalogEntry {
        CatalogEntry {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            price_regular: self.price_regular,
            price_tall: self.price_tall,
            image: self.image.clone(),
        }
    }
}

/// Merges stored menu records into the canonical defaults.
///
/// Defaults without an id get their 1-based position. The result keeps the
/// defaults' order, followed by appended records in the order they came.
#[must_use]
pub fn merge_menu(defaults: &[MenuItemConfig], records: &[MenuRecord]) -> Vec<MergedEntry> {
    let mut merged: Vec<MergedEntry> = defaults
        .iter()
        .zip(1_i64..)
        .map(|(entry, position)| MergedEntry {
            id: entry.id.unwrap_or(position),
            name: entry.name.clone(),
            description: entry.description.clone(),
            price_regular: entry.price_regular,
            price_tall: entry.price_tall,
            image: entry
                .image
                .clone()
                .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            is_deleted: false,
        })
        .collect();

    let mut max_id = merged.iter().map(|entry| entry.id).max().unwrap_or(0);

    for record in records {
        let position = match record.id {
            Some(id) => merged.iter().position(|entry| entry.id == id),
            None => {
                let wanted = record.name.to_lowercase();
                let same_name = |entry: &MergedEntry| entry.name.to_lowercase() == wanted;
                // A live entry wins over a tombstone with the same name.
                merged
                    .iter()
                    .position(|entry| same_name(entry) && !entry.is_deleted)
                    .or_else(|| merged.iter().position(same_name))
            }
        };

        if let Some(index) = position {
            merged[index].overlay(record);
        } else {
            let id = record.id.unwrap_or(max_id + 1);
            max_id = max_id.max(id);
            merged.push(MergedEntry::from_record(id, record));
        }
    }

    merged
}

/// Writes the merged menu back to `menu_items` and publishes it.
async fn apply_merge<C>(db: &C, merged: &[MergedEntry]) -> Result<SyncReport>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now().naive_utc();
    let mut report = SyncReport {
        total: merged.len(),
        ..SyncReport::default()
    };

    for entry in merged {
        match MenuItem::find_by_id(entry.id).one(db).await? {
            Some(existing) => {
                let unchanged = existing.name == entry.name
                    && existing.description == entry.description
                    && existing.price_regular.to_bits() == entry.price_regular.to_bits()
                    && existing.price_tall.to_bits() == entry.price_tall.to_bits()
                    && existing.image == entry.image
                    && existing.is_deleted == entry.is_deleted;
                if unchanged {
                    continue;
                }

                let mut item: menu_item::ActiveModel = existing.into();
                item.name = Set(entry.name.clone());
                item.description = Set(entry.description.clone());
                item.price_regular = Set(entry.price_regular);
                item.price_tall = Set(entry.price_tall);
                item.image = Set(entry.image.clone());
                item.is_deleted = Set(entry.is_deleted);
                item.updated_at = Set(now);
                item.update(db).await?;
                report.updated += 1;
            }
            None => {
                menu_item::ActiveModel {
                    id: Set(entry.id),
                    name: Set(entry.name.clone()),
                    description: Set(entry.description.clone()),
                    price_regular: Set(entry.price_regular),
                    price_tall: Set(entry.price_tall),
                    image: Set(entry.image.clone()),
                    is_deleted: Set(entry.is_deleted),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(db)
                .await?;
                report.inserted += 1;
            }
        }
    }

    let catalog: Vec<CatalogEntry> = merged
        .iter()
        .filter(|entry| !entry.is_deleted)
        .map(MergedEntry::to_catalog)
        .collect();
    report.published = catalog.len();
    write_state(db, CUSTOMER_MENU_KEY, serde_json::to_string(&catalog)?).await?;

    Ok(report)
}

async fn stored_records<C>(db: &C) -> Result<Vec<MenuRecord>>
where
    C: ConnectionTrait,
{
    let items = MenuItem::find()
        .order_by_asc(menu_item::Column::Id)
        .all(db)
        .await?;
    Ok(items.iter().map(MenuRecord::from).collect())
}

/// Merges the stored menu with the defaults and publishes the result.
///
/// Runs in one database transaction, so a failed write leaves both the
/// catalog and the published menu untouched.
pub async fn sync_customer_menu(
    db: &DatabaseConnection,
    defaults: &[MenuItemConfig],
) -> Result<SyncReport> {
    let txn = db.begin().await?;
    let records = stored_records(&txn).await?;
    let merged = merge_menu(defaults, &records);
    let report = apply_merge(&txn, &merged).await?;
    txn.commit().await?;

    info!(
        "Menu synced: {} items, {} published ({} inserted, {} updated)",
        report.total, report.published, report.inserted, report.updated
    );
    Ok(report)
}

/// Imports a legacy menu export (a JSON array in any historical schema) and
/// syncs it in after the records already stored.
///
/// # Errors
/// Returns an error if the JSON cannot be parsed or is not an array, or if the
/// database write fails.
pub async fn import_legacy_menu(
    db: &DatabaseConnection,
    defaults: &[MenuItemConfig],
    json: &str,
) -> Result<SyncReport> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(entries) = value else {
        return Err(Error::validation("Legacy menu must be a JSON array"));
    };
    let legacy: Vec<MenuRecord> = entries.iter().map(MenuRecord::from_legacy).collect();

    let txn = db.begin().await?;
    let mut records = stored_records(&txn).await?;
    records.extend(legacy);
    let merged = merge_menu(defaults, &records);
    let report = apply_merge(&txn, &merged).await?;
    txn.commit().await?;

    info!(
        "Imported {} legacy menu records, {} items published",
        entries.len(),
        report.published
    );
    Ok(report)
}

/// Reads the published customer menu.
///
/// A missing snapshot is an empty menu. A corrupt snapshot is logged and also
/// read as empty. Entries without a name or with a non-positive regular price
/// are left out.
pub async fn get_customer_menu(db: &DatabaseConnection) -> Result<Vec<CatalogEntry>> {
    let Some(raw) = read_state(db, CUSTOMER_MENU_KEY).await? else {
        return Ok(Vec::new());
    };

    let entries: Vec<CatalogEntry> = match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Published customer menu is corrupt, showing an empty menu: {}", e);
            return Ok(Vec::new());
        }
    };

    Ok(entries
        .into_iter()
        .filter(|entry| !entry.name.trim().is_empty() && entry.price_regular > 0.0)
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::config::store::StoreConfig;
    use crate::core::menu;
    use crate::test_utils::{drink_input, setup_test_db};
    use serde_json::json;

    fn defaults() -> Vec<MenuItemConfig> {
        StoreConfig::default().menu
    }

    fn record(id: Option<i64>, name: &str, regular: f64) -> MenuRecord {
        MenuRecord {
            id,
            name: name.to_string(),
            description: String::new(),
            price_regular: regular,
            price_tall: regular + 30.0,
            image: DEFAULT_IMAGE.to_string(),
            is_deleted: false,
        }
    }

    #[test]
    fn test_merge_without_records_numbers_defaults() {
        let mut base = defaults();
        base[1].id = None;
        let merged = merge_menu(&base, &[]);

        assert_eq!(merged.len(), 12);
        assert_eq!(merged[1].id, 2);
        assert_eq!(merged[0].name, "Pure Sugarcane");
        assert!(merged.iter().all(|entry| !entry.is_deleted));
    }

    #[test]
    fn test_merge_overlays_by_id() {
        let merged = merge_menu(&defaults(), &[record(Some(3), "Lemon Cane Plus", 95.0)]);

        assert_eq!(merged.len(), 12);
        assert_eq!(merged[2].id, 3);
        assert_eq!(merged[2].name, "Lemon Cane Plus");
        assert_eq!(merged[2].price_regular, 95.0);
    }

    #[test]
    fn test_merge_overlays_id_less_record_by_name() {
        let merged = merge_menu(&defaults(), &[record(None, "lemon cane", 93.0)]);

        assert_eq!(merged.len(), 12);
        assert_eq!(merged[2].id, 3);
        assert_eq!(merged[2].price_regular, 93.0);
    }

    #[test]
    fn test_merge_appends_new_records() {
        let merged = merge_menu(
            &defaults(),
            &[
                record(Some(40), "Mint Cane", 95.0),
                record(None, "Ginger Cane", 95.0),
            ],
        );

        assert_eq!(merged.len(), 14);
        assert_eq!(merged[12].id, 40);
        assert_eq!(merged[12].name, "Mint Cane");
        assert_eq!(merged[13].id, 41);
    }

    #[test]
    fn test_merge_keeps_tombstones() {
        let mut deleted = record(Some(1), "Pure Sugarcane", 79.0);
        deleted.is_deleted = true;
        let merged = merge_menu(&defaults(), &[deleted]);

        assert_eq!(merged.len(), 12);
        assert!(merged[0].is_deleted);
    }

    #[test]
    fn test_merge_name_match_prefers_live_entry_over_tombstone() {
        let mut deleted = record(Some(3), "Lemon Cane", 89.0);
        deleted.is_deleted = true;
        let merged = merge_menu(
            &defaults(),
            &[
                deleted,
                record(Some(13), "Lemon Cane", 92.0),
                record(None, "Lemon Cane", 99.0),
            ],
        );

        assert_eq!(merged.len(), 13);
        assert!(merged[2].is_deleted);
        assert_eq!(merged[12].id, 13);
        assert_eq!(merged[12].price_regular, 99.0);

        let live: Vec<&MergedEntry> = merged
            .iter()
            .filter(|entry| entry.name == "Lemon Cane" && !entry.is_deleted)
            .collect();
        assert_eq!(live.len(), 1);
    }

    #[test]
    fn test_merge_name_match_falls_back_to_tombstone() {
        let mut deleted = record(Some(3), "Lemon Cane", 89.0);
        deleted.is_deleted = true;
        let merged = merge_menu(&defaults(), &[deleted, record(None, "lemon cane", 95.0)]);

        assert_eq!(merged.len(), 12);
        assert_eq!(merged[2].id, 3);
        assert!(!merged[2].is_deleted);
        assert_eq!(merged[2].price_regular, 95.0);
    }

    #[test]
    fn test_from_legacy_three_tier_prices() {
        let record = MenuRecord::from_legacy(&json!({
            "name": "Old Cane",
            "desc": "From the old menu",
            "priceSmall": "75",
            "priceMedium": 0,
            "priceLarge": 115,
            "img": "images/old.png"
        }));

        assert_eq!(record.id, None);
        assert_eq!(record.price_regular, 75.0);
        assert_eq!(record.price_tall, 115.0);
        assert_eq!(record.description, "From the old menu");
        assert_eq!(record.image, "images/old.png");
    }

    #[test]
    fn test_from_legacy_defaults() {
        let record = MenuRecord::from_legacy(&json!({ "id": "7", "priceRegular": 99 }));

        assert_eq!(record.id, Some(7));
        assert_eq!(record.name, "Unnamed");
        assert_eq!(record.price_tall, 99.0);
        assert_eq!(record.image, DEFAULT_IMAGE);
        assert!(!record.is_deleted);

        let empty = MenuRecord::from_legacy(&json!({ "id": 0, "priceRegular": "abc" }));
        assert_eq!(empty.id, None);
        assert_eq!(empty.price_regular, 0.0);
    }

    #[tokio::test]
    async fn test_sync_publishes_defaults_on_empty_db() -> Result<()> {
        let db = setup_test_db().await?;
        let report = sync_customer_menu(&db, &defaults()).await?;

        assert_eq!(report.total, 12);
        assert_eq!(report.inserted, 12);
        assert_eq!(report.published, 12);
        assert_eq!(get_customer_menu(&db).await?.len(), 12);

        let again = sync_customer_menu(&db, &defaults()).await?;
        assert_eq!(again.inserted, 0);
        assert_eq!(again.updated, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_sync_propagates_edits_and_deletes() -> Result<()> {
        let db = setup_test_db().await?;
        sync_customer_menu(&db, &defaults()).await?;

        menu::update_menu_item(&db, 2, drink_input("Calamansi Cane", 90.0, 120.0)).await?;
        menu::delete_menu_item(&db, 1).await?;
        menu::create_menu_item(&db, drink_input("Mint Cane", 95.0, 125.0)).await?;

        let report = sync_customer_menu(&db, &defaults()).await?;
        assert_eq!(report.total, 13);
        assert_eq!(report.published, 12);

        let published = get_customer_menu(&db).await?;
        assert!(published.iter().all(|entry| entry.name != "Pure Sugarcane"));
        let calamansi = published.iter().find(|entry| entry.id == 2).unwrap();
        assert_eq!(calamansi.price_regular, 90.0);
        assert!(published.iter().any(|entry| entry.id == 13 && entry.name == "Mint Cane"));
        Ok(())
    }

    #[tokio::test]
    async fn test_import_legacy_menu() -> Result<()> {
        let db = setup_test_db().await?;
        let legacy = r#"[
            {"name": "Lemon Cane", "priceSmall": 85, "priceLarge": 125},
            {"name": "Coconut Cane", "description": "Buko", "priceSmall": "99"}
        ]"#;

        let report = import_legacy_menu(&db, &defaults(), legacy).await?;
        assert_eq!(report.total, 13);

        let lemon = menu::get_menu_item_by_id(&db, 3).await?.unwrap();
        assert_eq!(lemon.price_regular, 85.0);
        assert_eq!(lemon.price_tall, 125.0);

        let coconut = menu::get_menu_item_by_name(&db, "coconut cane").await?.unwrap();
        assert_eq!(coconut.id, 13);
        assert_eq!(coconut.price_tall, 99.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_import_rejects_non_array() -> Result<()> {
        let db = setup_test_db().await?;
        let result = import_legacy_menu(&db, &defaults(), r#"{"name": "x"}"#).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = import_legacy_menu(&db, &defaults(), "not json").await;
        assert!(matches!(result, Err(Error::Json(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_customer_menu_filters_and_survives_corruption() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(get_customer_menu(&db).await?.is_empty());

        write_state(
            &db,
            CUSTOMER_MENU_KEY,
            json!([
                {"id": 1, "name": "Pure Sugarcane", "price_regular": 79.0, "price_tall": 109.0},
                {"id": 2, "name": "  ", "price_regular": 79.0, "price_tall": 109.0},
                {"id": 3, "name": "Free Cane", "price_regular": 0.0, "price_tall": 0.0}
            ])
            .to_string(),
        )
        .await?;
        let menu = get_customer_menu(&db).await?;
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].name, "Pure Sugarcane");

        write_state(&db, CUSTOMER_MENU_KEY, "[{broken".to_string()).await?;
        assert!(get_customer_menu(&db).await?.is_empty());
        Ok(())
    }
}
