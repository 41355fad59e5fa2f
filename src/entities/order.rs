//! Order entity - A submitted cart with its computed totals and status.

use super::sea_orm_active_enums::OrderStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Display id in the `ORD-NNN` form
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Name the order was placed under
    pub customer_name: String,
    /// Account username, if the customer was logged in
    pub customer_username: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    /// Free-text notes for the whole order
    pub notes: Option<String>,
    /// Sum of line totals before tax
    pub subtotal: f64,
    /// Tax amount, rounded to cents
    pub tax: f64,
    /// Subtotal plus tax, rounded to cents
    pub total: f64,
    /// Tax rate (fraction, e.g. 0.085) in effect at checkout
    pub tax_rate: f64,
    /// Current lifecycle status
    pub status: OrderStatus,
    /// When the order was placed
    pub created_at: DateTimeUtc,
    /// When the status last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Line items of this order
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
