//! General Discord commands - ping and help.
//! These commands don't touch the database.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let business_name = &ctx.data().config.store.business_name;
        let help_text = format!(
            "**{business_name} Help**\n\n\
        **Ordering**\n\
        • `/menu` - Shows the drink menu.\n\
        • `/cart add <drink> [size] [special] [notes] [quantity]` - Adds a drink to your cart.\n\
        • `/cart show|increase|decrease|remove|clear` - Manage your cart.\n\
        • `/checkout [name] [phone] [notes]` - Places your order.\n\
        • `/orders` - Shows your orders (staff see every order).\n\
        • `/announcements` - Shows the latest announcements.\n\n\
        **Account**\n\
        • `/register`, `/login`, `/logout` - Manage your session.\n\
        • `/profile show|update`, `/password` - Manage your account.\n\n\
        **Cashier**\n\
        • `/order approve|advance|cancel|details|clear` - Work the order queue.\n\
        • `/sales show [days]`, `/sales reset` - Sales summary and daily revenue.\n\
        • `/stock list|in|out` - Track cup stock.\n\n\
        **Admin**\n\
        • `/menu_manage add|update|delete|sync` - Edit the menu and publish it.\n\
        • `/accounts list|add|edit|active|delete` - Manage accounts.\n\
        • `/settings show|general|notifications` - Store settings.\n\
        • `/announce <title> <content> [image]`, `/unannounce <id>` - Announcements.\n\n\
        • `/ping` - Checks if the bot is responsive."
        );

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
