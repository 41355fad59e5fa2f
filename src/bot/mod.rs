//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the storefront: slash
//! commands for customers, cashiers and admins, autocomplete handlers, and the
//! shared bot context.

/// Discord command implementations (menu, cart, orders, accounts, admin, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::{store::StoreConfig, users::RoleDirectory},
    core::{account, cart::Cart},
    entities::{Role, user},
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Store configuration (canonical menu and seed data)
    pub config: Arc<StoreConfig>,
    /// Staff roles by Discord user ID
    pub roles: RoleDirectory,
    /// Open carts by Discord user ID
    pub carts: Mutex<HashMap<u64, Cart>>,
    /// Logged-in account IDs by Discord user ID
    pub sessions: Mutex<HashMap<u64, i64>>,
}

impl BotData {
    /// Creates a new `BotData` with no open carts or sessions.
    #[must_use]
    pub fn new(database: DatabaseConnection, config: Arc<StoreConfig>, roles: RoleDirectory) -> Self {
        Self {
            database,
            config,
            roles,
            carts: Mutex::new(HashMap::new()),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Removes and returns a Discord user's cart, empty if they had none.
    ///
    /// Checkout takes the cart before placing the order so lines added in
    /// the meantime start a new cart instead of being dropped with the old one.
    pub async fn take_cart(&self, user_id: u64) -> Cart {
        self.carts.lock().await.remove(&user_id).unwrap_or_default()
    }

    /// Puts back a cart taken by [`BotData::take_cart`] after a failed
    /// checkout. Lines added since then are kept after the restored ones.
    pub async fn restore_cart(&self, user_id: u64, mut cart: Cart) {
        let mut carts = self.carts.lock().await;
        if let Some(newer) = carts.remove(&user_id) {
            cart.absorb(newer);
        }
        carts.insert(user_id, cart);
    }

    /// Binds a Discord user to an account until [`BotData::logout`].
    pub async fn login(&self, user_id: u64, account_id: i64) {
        self.sessions.lock().await.insert(user_id, account_id);
    }

    /// Ends a Discord user's session. Returns the account ID it was bound to.
    pub async fn logout(&self, user_id: u64) -> Option<i64> {
        self.sessions.lock().await.remove(&user_id)
    }

    /// The account a Discord user is logged in as, if any.
    ///
    /// The account is read from the database on every call, so role and
    /// profile edits apply at once. Sessions of deleted or deactivated
    /// accounts are ended here.
    pub async fn session(&self, user_id: u64) -> Result<Option<user::Model>> {
        let Some(account_id) = self.sessions.lock().await.get(&user_id).copied() else {
            return Ok(None);
        };

        match account::get_account_by_id(&self.database, account_id).await? {
            Some(account) if account.is_active => Ok(Some(account)),
            _ => {
                info!("Ending session of Discord user {} (account {} unavailable)", user_id, account_id);
                self.sessions.lock().await.remove(&user_id);
                Ok(None)
            }
        }
    }

    /// Role of a Discord user: the logged-in account's role, otherwise the
    /// role from the environment directory.
    pub async fn role_of(&self, user_id: u64) -> Result<Role> {
        Ok(match self.session(user_id).await? {
            Some(account) => account.role,
            None => self.roles.role_for(user_id),
        })
    }
}

/// Checks the caller's role and tells them when they lack permission.
///
/// Returns `false` (after replying) when the command should stop.
pub async fn ensure_role(
    ctx: poise::Context<'_, BotData, Error>,
    allowed: &[Role],
    action: &str,
) -> Result<bool> {
    let role = ctx.data().role_of(ctx.author().id.get()).await?;
    match account::require_role(role, allowed, action) {
        Ok(()) => Ok(true),
        Err(e) => {
            ctx.say(format!("⛔ {e}")).await?;
            Ok(false)
        }
    }
}

/// Shows a user error to the caller, or propagates a system error to the
/// framework's error handler.
pub async fn reply_error(ctx: poise::Context<'_, BotData, Error>, error: Error) -> Result<()> {
    if error.is_user_error() {
        warn!("Command `{}` rejected: {}", ctx.command().name, error);
        ctx.say(format!("❌ {error}")).await?;
        Ok(())
    } else {
        Err(error)
    }
}

/// Sends a reply only the caller can see.
pub async fn say_private(ctx: poise::Context<'_, BotData, Error>, text: String) -> Result<()> {
    ctx.send(poise::CreateReply::default().content(text).ephemeral(true))
        .await?;
    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx
                .say("❌ Something went wrong while handling that command.")
                .await
            {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Connects to Discord and runs the bot until the client stops.
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered {} commands globally", framework.options().commands.len());
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::Client::builder(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::seeded_test_db;

    async fn bot_data() -> Result<BotData> {
        let db = seeded_test_db().await?;
        Ok(BotData::new(
            db,
            Arc::new(StoreConfig::default()),
            RoleDirectory::from_lists("", "42"),
        ))
    }

    #[tokio::test]
    async fn test_session_follows_account_edits() -> Result<()> {
        let data = bot_data().await?;
        let cashier = account::get_account_by_username(&data.database, "cashier1")
            .await?
            .unwrap();

        data.login(7, cashier.id).await;
        assert_eq!(data.role_of(7).await?, Role::Cashier);

        account::update_account(&data.database, cashier.id, "frontdesk", Role::Customer).await?;
        assert_eq!(data.role_of(7).await?, Role::Customer);
        assert_eq!(data.session(7).await?.unwrap().username, "frontdesk");
        Ok(())
    }

    #[tokio::test]
    async fn test_session_ends_when_account_is_deactivated() -> Result<()> {
        let data = bot_data().await?;
        let customer = account::get_account_by_username(&data.database, "customer1")
            .await?
            .unwrap();

        // Discord user 42 is a cashier by directory, a customer once logged in
        data.login(42, customer.id).await;
        assert_eq!(data.role_of(42).await?, Role::Customer);

        account::set_active(&data.database, customer.id, false).await?;
        assert!(data.session(42).await?.is_none());
        assert_eq!(data.role_of(42).await?, Role::Cashier);
        assert!(data.sessions.lock().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_checkout_restores_cart_with_newer_lines() -> Result<()> {
        let data = bot_data().await?;
        let menu = crate::core::sync::get_customer_menu(&data.database).await?;

        data.carts.lock().await.entry(7).or_default().quick_add(&menu[0])?;
        let taken = data.take_cart(7).await;
        assert_eq!(taken.item_count(), 1);
        assert!(data.carts.lock().await.get(&7).is_none());

        // A line added while the order was being placed
        data.carts.lock().await.entry(7).or_default().quick_add(&menu[1])?;
        data.restore_cart(7, taken).await;

        let carts = data.carts.lock().await;
        let names: Vec<&str> = carts[&7].lines().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec![menu[0].name.as_str(), menu[1].name.as_str()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_logout_falls_back_to_directory_role() -> Result<()> {
        let data = bot_data().await?;
        let admin = account::get_account_by_username(&data.database, "admin")
            .await?
            .unwrap();

        data.login(7, admin.id).await;
        assert_eq!(data.role_of(7).await?, Role::Admin);
        assert_eq!(data.logout(7).await, Some(admin.id));
        assert_eq!(data.role_of(7).await?, Role::Customer);
        Ok(())
    }
}
