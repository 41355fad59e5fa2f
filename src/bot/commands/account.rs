//! Account Discord commands - registration, login sessions and profiles.
//! Replies that echo credentials or personal details are ephemeral.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, reply_error, say_private},
        core::account::{self, ProfileUpdate, Registration},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use tracing::info;

    /// Creates a customer account and logs you in.
    #[poise::command(slash_command, ephemeral)]
    pub async fn register(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Your name"] name: String,
        #[description = "Username"] username: String,
        #[description = "Email address"] email: String,
        #[description = "Password (at least 6 characters)"] password: String,
        #[description = "Password again"] confirm_password: String,
    ) -> Result<()> {
        let data = ctx.data();
        let registration = Registration {
            name,
            username,
            email,
            password,
            confirm_password,
        };

        match account::register_customer(&data.database, registration).await {
            Ok(created) => {
                data.login(ctx.author().id.get(), created.id).await;
                say_private(
                    ctx,
                    format!(
                        "✅ Welcome, **{}**! Your account is ready and you are logged in.",
                        created.username
                    ),
                )
                .await
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Logs in with your username or email.
    #[poise::command(slash_command, ephemeral)]
    pub async fn login(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Username or email"] identifier: String,
        #[description = "Password"] password: String,
    ) -> Result<()> {
        let data = ctx.data();

        match account::authenticate(&data.database, &identifier, &password).await {
            Ok(logged_in) => {
                info!(
                    "Discord user {} logged in as {} ({})",
                    ctx.author().id,
                    logged_in.username,
                    logged_in.role
                );
                data.login(ctx.author().id.get(), logged_in.id).await;
                say_private(
                    ctx,
                    format!(
                        "✅ Logged in as **{}** ({}).",
                        logged_in.username, logged_in.role
                    ),
                )
                .await
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Ends your session.
    #[poise::command(slash_command, ephemeral)]
    pub async fn logout(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let reply = match ctx.data().logout(ctx.author().id.get()).await {
            Some(_) => "👋 Logged out.".to_string(),
            None => "You are not logged in.".to_string(),
        };
        say_private(ctx, reply).await
    }

    /// Parent command for your own profile.
    #[poise::command(slash_command, subcommands("profile_show", "profile_update"))]
    pub async fn profile(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Profile command. Available subcommands:\n\
            `/profile show` - Show your profile\n\
            `/profile update` - Change your details";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows your profile.
    #[poise::command(slash_command, rename = "show")]
    pub async fn profile_show(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let Some(account) = ctx.data().session(ctx.author().id.get()).await? else {
            say_private(ctx, "Log in with `/login` first.".to_string()).await?;
            return Ok(());
        };

        let embed = serenity::CreateEmbed::default()
            .title(format!("**{}**", account.name))
            .color(0x0014_6B33)
            .fields(vec![
                ("Username", account.username.clone(), true),
                ("Role", account.role.to_string(), true),
                ("Email", account.email.clone().unwrap_or_else(|| "-".to_string()), false),
                ("Phone", account.phone.clone().unwrap_or_else(|| "-".to_string()), true),
                ("Address", account.address.clone().unwrap_or_else(|| "-".to_string()), false),
            ]);

        ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
            .await?;
        Ok(())
    }

    /// Changes your name, username or contact details.
    #[poise::command(slash_command, rename = "update", ephemeral)]
    pub async fn profile_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Your name"] name: Option<String>,
        #[description = "Username"] username: Option<String>,
        #[description = "Email address"] email: Option<String>,
        #[description = "Phone number (e.g., 09171234567)"] phone: Option<String>,
        #[description = "Delivery address"] address: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.get();
        let Some(session) = data.session(user_id).await? else {
            say_private(ctx, "Log in with `/login` first.".to_string()).await?;
            return Ok(());
        };

        let profile = ProfileUpdate {
            name: name.unwrap_or(session.name),
            username: username.unwrap_or(session.username),
            email: email.or(session.email),
            phone: phone.or(session.phone),
            address: address.or(session.address),
        };

        match account::update_profile(&data.database, session.id, profile).await {
            Ok(updated) => {
                say_private(ctx, format!("✅ Profile saved for **{}**.", updated.username))
                    .await
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Changes your password.
    #[poise::command(slash_command, ephemeral)]
    pub async fn password(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Current password"] current: String,
        #[description = "New password (at least 6 characters)"] new_password: String,
        #[description = "New password again"] confirm: String,
    ) -> Result<()> {
        let data = ctx.data();
        let Some(session) = data.session(ctx.author().id.get()).await? else {
            say_private(ctx, "Log in with `/login` first.".to_string()).await?;
            return Ok(());
        };

        match account::change_password(&data.database, session.id, &current, &new_password, &confirm)
            .await
        {
            Ok(()) => say_private(ctx, "✅ Password changed.".to_string()).await,
            Err(e) => reply_error(ctx, e).await,
        }
    }
}

// Re-export all commands
pub use inner::*;
