//! User entity - One row per account, whatever the role.
//!
//! Staff accounts created by an admin and customers who registered themselves
//! live in the same table and are told apart by [`Role`].

use super::sea_orm_active_enums::Role;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Administrator")
    pub name: String,
    /// Login name, unique across all accounts
    #[sea_orm(unique)]
    pub username: String,
    /// Optional email, also accepted as a login identifier
    pub email: Option<String>,
    /// Argon2 PHC string; the plain password is never stored
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role that gates bot commands
    pub role: Role,
    /// Normalized phone number (`+63...`)
    pub phone: Option<String>,
    /// Delivery or contact address
    pub address: Option<String>,
    /// Inactive accounts cannot log in
    pub is_active: bool,
    /// When the account was created
    pub created_at: DateTime,
    /// When the account was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Announcements posted by this user
    #[sea_orm(has_many = "super::announcement::Entity")]
    Announcement,
}

impl Related<super::announcement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Announcement.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
