//! Inventory entity - Cup stock counted per drink name.
//!
//! Only drinks with a row here are tracked; everything else is assumed to be
//! made to order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inventory database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Drink name, matched case-insensitively against order lines
    #[sea_orm(unique)]
    pub name: String,
    /// Units on hand, never negative
    pub stock: i32,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
