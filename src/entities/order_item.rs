//! Order item entity - Snapshot of one cart line at checkout time.
//!
//! The drink name and price are copied so an order still reads correctly after
//! the menu item is edited or deleted.

use super::sea_orm_active_enums::{DrinkSize, Special};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning order
    pub order_id: String,
    /// Menu item the line was made from (not enforced)
    pub menu_item_id: Option<i64>,
    /// Drink name at checkout
    pub name: String,
    pub size: DrinkSize,
    pub special: Special,
    /// Per-line note (e.g., "less sugar")
    pub notes: String,
    pub quantity: i32,
    /// Size price plus special surcharge
    pub unit_price: f64,
}

impl Model {
    /// `unit_price * quantity`
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Defines relationships between `OrderItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
