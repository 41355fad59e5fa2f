//! Menu item entity - The admin-maintained drink catalog.
//!
//! Ids are assigned by the application (max id + 1) rather than by `SQLite`,
//! so that merged records keep the ids they had in older menu exports.
//! Deleted items stay in the table as tombstones for the menu sync.

use super::sea_orm_active_enums::DrinkSize;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Menu item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_items")]
pub struct Model {
    /// Application-assigned identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// Drink name (e.g., "Lemon Cane")
    pub name: String,
    /// Short description shown on the menu
    pub description: String,
    /// Price of a Regular cup
    pub price_regular: f64,
    /// Price of a Tall cup
    pub price_tall: f64,
    /// Opaque image reference (path, URL or data URI)
    pub image: String,
    /// Soft delete flag - deleted drinks stay out of the customer menu
    pub is_deleted: bool,
    /// When the item was created
    pub created_at: DateTime,
    /// When the item was last modified
    pub updated_at: DateTime,
}

impl Model {
    /// Unit price for the requested size. Tall falls back to the regular
    /// price when it was never set.
    #[must_use]
    pub fn price_for(&self, size: DrinkSize) -> f64 {
        match size {
            DrinkSize::Tall if self.price_tall > 0.0 => self.price_tall,
            DrinkSize::Regular | DrinkSize::Tall => self.price_regular,
        }
    }
}

/// Menu items have no foreign keys; order items keep a snapshot instead
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
