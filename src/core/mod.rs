//! Core business logic, independent of the Discord layer.

/// User accounts, login and permission checks
pub mod account;
/// Admin announcements
pub mod announcement;
/// First-run seeding
pub mod bootstrap;
/// In-memory shopping cart
pub mod cart;
/// Cup stock for tracked drinks
pub mod inventory;
/// Admin drink catalog
pub mod menu;
/// Checkout and order lifecycle
pub mod order;
/// Text formatting for orders and sales
pub mod report;
/// Sales summaries computed from orders
pub mod sales;
/// Store settings and key/value state
pub mod settings;
/// Merge of the admin catalog into the customer menu
pub mod sync;
