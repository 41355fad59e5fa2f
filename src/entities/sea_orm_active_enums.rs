//! String-backed enums stored in entity columns.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role. Decides which bot commands a user may run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages menu, accounts, announcements and settings
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Approves and fulfils orders, manages stock
    #[sea_orm(string_value = "cashier")]
    Cashier,
    /// Browses the menu and places orders
    #[sea_orm(string_value = "customer")]
    Customer,
}

impl Role {
    /// Parses a role name case-insensitively (`"Admin"`, `"cashier"`, ...).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "cashier" => Some(Self::Cashier),
            "customer" => Some(Self::Customer),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Admin => "admin",
            Self::Cashier => "cashier",
            Self::Customer => "customer",
        };
        f.write_str(name)
    }
}

/// Order lifecycle. Cancelled orders are removed rather than kept in a state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "preparing")]
    Preparing,
    #[sea_orm(string_value = "ready")]
    Ready,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl OrderStatus {
    /// The status a fulfilled step moves to, if any.
    ///
    /// Pending orders only leave that state through approval, so `next` is
    /// `None` for them as well as for completed orders.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Approved => Some(Self::Preparing),
            Self::Preparing => Some(Self::Ready),
            Self::Ready => Some(Self::Completed),
            Self::Pending | Self::Completed => None,
        }
    }

    /// Whether the order counts toward sales (everything past approval).
    #[must_use]
    pub const fn is_sale(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Cup size. The two tiers replaced the older small/medium/large prices.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum DrinkSize {
    #[sea_orm(string_value = "Regular")]
    Regular,
    #[sea_orm(string_value = "Tall")]
    Tall,
}

impl fmt::Display for DrinkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => f.write_str("Regular"),
            Self::Tall => f.write_str("Tall"),
        }
    }
}

/// Special preparation instruction chosen per cart line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Special {
    #[sea_orm(string_value = "None")]
    None,
    #[sea_orm(string_value = "No Ice")]
    #[serde(rename = "No Ice")]
    NoIce,
}

/// Extra charged per cup when ice is left out (more juice goes in).
pub const NO_ICE_SURCHARGE: f64 = 20.0;

impl Special {
    /// Per-unit surcharge for this instruction.
    #[must_use]
    pub const fn surcharge(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::NoIce => NO_ICE_SURCHARGE,
        }
    }
}

impl fmt::Display for Special {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::NoIce => f.write_str("No Ice"),
        }
    }
}
