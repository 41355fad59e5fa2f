//! Unified error type for the storefront.
//!
//! Core operations return [`Result`], and the bot layer reuses the same type as
//! the poise framework error so that `?` works across both layers.

use thiserror::Error;

/// Every failure the storefront can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Underlying `SeaORM` failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Input rejected before touching the database
    #[error("Validation failed: {message}")]
    Validation {
        /// Which rule was broken
        message: String,
    },

    /// Prices must be positive, finite numbers
    #[error("Invalid price: {amount}")]
    InvalidPrice {
        /// The rejected price
        amount: f64,
    },

    /// Quantities must be positive
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: i64,
    },

    #[error("Menu item not found: {name}")]
    MenuItemNotFound {
        /// Name or id used for the lookup
        name: String,
    },

    #[error("Cart line not found: {line_id}")]
    CartLineNotFound {
        /// Line id used for the lookup
        line_id: u64,
    },

    #[error("Order not found: {id}")]
    OrderNotFound {
        /// Order id used for the lookup
        id: String,
    },

    #[error("Account not found: {username}")]
    AccountNotFound {
        /// Username, email or id used for the lookup
        username: String,
    },

    #[error("Username or email already in use: {value}")]
    DuplicateAccount {
        /// The conflicting username or email
        value: String,
    },

    #[error("Incorrect email/username or password")]
    InvalidCredentials,

    #[error("Permission denied: {role} cannot {action}")]
    PermissionDenied {
        /// Role of the caller
        role: String,
        /// What the caller tried to do
        action: String,
    },

    #[error("Order {id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Order id
        id: String,
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Inventory item name
        name: String,
        /// Units requested
        requested: i64,
        /// Units on hand
        available: i32,
    },

    #[error("Password hashing error: {message}")]
    PasswordHash {
        /// Message from the hasher
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),

    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether the error was caused by the caller's input rather than by the
    /// system. The bot shows these as-is and logs them at a lower level.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(
            self,
            Self::Config { .. }
                | Self::Database(_)
                | Self::PasswordHash { .. }
                | Self::Json(_)
                | Self::Io(_)
                | Self::EnvVar(_)
                | Self::IntConversion(_)
                | Self::Framework(_)
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
