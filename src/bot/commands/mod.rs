//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

use crate::{bot::BotData, errors::Error};

/// Registration, login and profile commands
pub mod account;

/// Announcement, stock, account management and settings commands
pub mod admin;

/// Cart and checkout commands
pub mod cart;

/// General utility commands
pub mod general;

/// Menu browsing and management commands
pub mod menu;

/// Order queue and sales commands
pub mod orders;

// Export commands
pub use account::*;
pub use admin::*;
pub use cart::*;
pub use general::*;
pub use menu::*;
pub use orders::*;

/// Every command the bot registers.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        // general
        ping(),
        help(),
        // customers
        menu::menu(),
        cart::cart(),
        checkout(),
        orders::orders(),
        announcements(),
        // accounts
        register(),
        login(),
        logout(),
        profile(),
        password(),
        // staff
        orders::order(),
        sales(),
        stock(),
        // admin
        menu_manage(),
        accounts(),
        admin::settings(),
        announce(),
        unannounce(),
    ]
}
