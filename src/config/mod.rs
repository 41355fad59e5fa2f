/// Database configuration and connection management
pub mod database;

/// Storefront configuration and seed data from config.toml
pub mod store;

/// Discord user to role mapping from environment variables
pub mod users;
