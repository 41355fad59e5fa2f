//! Store configuration loading from config.toml
//!
//! The file describes the storefront (name, currency, tax rate) and the data
//! used to seed an empty database: the canonical drink menu, tracked
//! inventory and the initial accounts. When the file is missing, the built-in
//! defaults from [`StoreConfig::default`] are used instead.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Placeholder image for drinks without one.
pub const DEFAULT_IMAGE: &str = "data:image/svg+xml;utf8,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><rect width='100' height='100' fill='%23FFD966'/><text x='50' y='55' font-size='30' fill='%23146B33' text-anchor='middle'>JC</text></svg>";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// General storefront settings
    #[serde(default)]
    pub store: StoreSection,
    /// Canonical drink menu, the base of every menu sync
    #[serde(default = "default_menu")]
    pub menu: Vec<MenuItemConfig>,
    /// Drinks whose cups are counted
    #[serde(default = "default_inventory")]
    pub inventory: Vec<InventoryConfig>,
    /// Accounts created when the users table is empty
    #[serde(default = "default_accounts")]
    pub accounts: Vec<AccountSeed>,
}

/// The `[store]` table
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    /// Name shown in receipts and the help text
    pub business_name: String,
    /// ISO currency code (`PHP`, `USD`)
    pub currency: String,
    /// Sales tax in percent (8.5 means 8.5%)
    pub tax_rate: f64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            business_name: "Jessie Cane Juicebar".to_string(),
            currency: "PHP".to_string(),
            tax_rate: 8.5,
        }
    }
}

/// One `[[menu]]` entry
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MenuItemConfig {
    /// Stable id; entries without one are numbered by position
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_regular: f64,
    pub price_tall: f64,
    /// Image reference; the placeholder is used when absent
    pub image: Option<String>,
}

/// One `[[inventory]]` entry
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct InventoryConfig {
    pub name: String,
    pub stock: i32,
}

/// One `[[accounts]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct AccountSeed {
    pub username: String,
    pub password: String,
    /// `admin`, `cashier` or `customer`
    pub role: String,
    pub name: String,
    pub email: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store: StoreSection::default(),
            menu: default_menu(),
            inventory: default_inventory(),
            accounts: default_accounts(),
        }
    }
}

fn drink(
    id: i64,
    name: &str,
    description: &str,
    price_regular: f64,
    price_tall: f64,
) -> MenuItemConfig {
    let slug = name.to_lowercase().replace(' ', "-");
    MenuItemConfig {
        id: Some(id),
        name: name.to_string(),
        description: description.to_string(),
        price_regular,
        price_tall,
        image: Some(format!("images/{slug}.png")),
    }
}

fn default_menu() -> Vec<MenuItemConfig> {
    vec![
        drink(
            1,
            "Pure Sugarcane",
            "Freshly pressed sugarcane juice in its purest form, naturally sweet with no added sugar or preservatives.",
            79.0,
            109.0,
        ),
        drink(
            2,
            "Calamansi Cane",
            "Classic sugarcane juice with the tangy freshness of calamansi.",
            89.0,
            119.0,
        ),
        drink(
            3,
            "Lemon Cane",
            "Freshly squeezed lemon combined with pure sugarcane juice.",
            89.0,
            119.0,
        ),
        drink(
            4,
            "Yakult Cane",
            "Sugarcane juice and Yakult, smooth and creamy with a sweet-tangy flavor.",
            89.0,
            119.0,
        ),
        drink(
            5,
            "Calamansi Yakult Cane",
            "Calamansi, Yakult and sugarcane juice in one glass.",
            99.0,
            129.0,
        ),
        drink(
            6,
            "Lemon Yakult Cane",
            "Zesty lemon and creamy Yakult over naturally sweet sugarcane.",
            99.0,
            129.0,
        ),
        drink(
            7,
            "Lychee Cane",
            "Fragrant lychee with the crisp freshness of sugarcane juice.",
            99.0,
            129.0,
        ),
        drink(
            8,
            "Orange Cane",
            "Fresh orange juice blended with pure sugarcane extract.",
            109.0,
            139.0,
        ),
        drink(
            9,
            "Passion Fruit Cane",
            "Tangy passion fruit and naturally sweet sugarcane.",
            119.0,
            149.0,
        ),
        drink(
            10,
            "Watermelon Cane",
            "Freshly pressed watermelon and sugarcane juice, light and cooling.",
            119.0,
            149.0,
        ),
        drink(
            11,
            "Strawberry Yogurt Cane",
            "Creamy strawberry yogurt meets sweet sugarcane.",
            119.0,
            149.0,
        ),
        drink(
            12,
            "Dragon Fruit Cane",
            "Dragon fruit and pure sugarcane juice, naturally sweet and loaded with antioxidants.",
            119.0,
            149.0,
        ),
    ]
}

fn default_inventory() -> Vec<InventoryConfig> {
    [
        ("Pure Sugarcane", 50),
        ("Calamansi Cane", 32),
        ("Lemon Cane", 45),
        ("Yakult Cane", 28),
        ("Lychee Cane", 35),
    ]
    .into_iter()
    .map(|(name, stock)| InventoryConfig {
        name: name.to_string(),
        stock,
    })
    .collect()
}

fn default_accounts() -> Vec<AccountSeed> {
    vec![
        AccountSeed {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            role: "admin".to_string(),
            name: "Administrator".to_string(),
            email: Some("admin@jessiecane.com".to_string()),
        },
        AccountSeed {
            username: "cashier1".to_string(),
            password: "password".to_string(),
            role: "cashier".to_string(),
            name: "Cashier".to_string(),
            email: None,
        },
        AccountSeed {
            username: "customer1".to_string(),
            password: "password".to_string(),
            role: "customer".to_string(),
            name: "Customer".to_string(),
            email: None,
        },
    ]
}

/// Loads store configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StoreConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    let config: StoreConfig = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if !(0.0..=100.0).contains(&config.store.tax_rate) {
        return Err(Error::Config {
            message: format!(
                "Tax rate must be between 0 and 100, got {}",
                config.store.tax_rate
            ),
        });
    }

    Ok(config)
}

/// Loads store configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<StoreConfig> {
    load_config("config.toml")
}
