//! Staff Discord commands - announcements, stock, accounts and settings.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, ensure_role, handlers::autocomplete, reply_error},
        core::{
            account, announcement,
            inventory::{self, DEFAULT_LOW_STOCK_THRESHOLD},
            settings::{self, GeneralSettings, NotificationSettings},
        },
        entities::Role,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    const STAFF: &[Role] = &[Role::Admin, Role::Cashier];

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum AccountRoleChoice {
        Cashier,
        Customer,
    }

    impl From<AccountRoleChoice> for Role {
        fn from(choice: AccountRoleChoice) -> Self {
            match choice {
                AccountRoleChoice::Cashier => Self::Cashier,
                AccountRoleChoice::Customer => Self::Customer,
            }
        }
    }

    fn yes_no(value: bool) -> &'static str {
        if value { "On" } else { "Off" }
    }

    /// Posts an announcement for customers.
    #[poise::command(slash_command)]
    pub async fn announce(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Headline"] title: String,
        #[description = "Announcement text"] content: String,
        #[description = "Optional picture"] image: Option<serenity::Attachment>,
    ) -> Result<()> {
        if !ensure_role(ctx, &[Role::Admin], "post announcements").await? {
            return Ok(());
        }
        let data = ctx.data();
        let author_id = data.session(ctx.author().id.get()).await?.map(|a| a.id);

        match announcement::post_announcement(
            &data.database,
            &title,
            &content,
            image.map(|a| a.url),
            author_id,
        )
        .await
        {
            Ok(posted) => {
                ctx.say(format!("📢 Posted announcement #{}: **{}**", posted.id, posted.title))
                    .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Takes an announcement down.
    #[poise::command(slash_command)]
    pub async fn unannounce(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Announcement number from /announcements"] id: i64,
    ) -> Result<()> {
        if !ensure_role(ctx, &[Role::Admin], "remove announcements").await? {
            return Ok(());
        }

        match announcement::delete_announcement(&ctx.data().database, id).await {
            Ok(removed) => {
                ctx.say(format!("🗑️ Removed announcement **{}**.", removed.title))
                    .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Shows the latest announcements.
    #[poise::command(slash_command)]
    pub async fn announcements(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let posts = announcement::get_active_announcements(&ctx.data().database).await?;
        if posts.is_empty() {
            ctx.say("No announcements right now.").await?;
            return Ok(());
        }

        let mut reply = poise::CreateReply::default();
        for post in posts.iter().take(10) {
            let mut embed = serenity::CreateEmbed::default()
                .title(&post.title)
                .description(&post.content)
                .color(0x00F5_A623)
                .footer(serenity::CreateEmbedFooter::new(format!(
                    "#{} · {}",
                    post.id,
                    post.created_at.format("%Y-%m-%d")
                )));
            if let Some(image) = &post.image {
                embed = embed.image(image);
            }
            reply = reply.embed(embed);
        }

        ctx.send(reply).await?;
        Ok(())
    }

    /// Parent command for cup stock.
    #[poise::command(slash_command, subcommands("stock_list", "stock_in", "stock_out"))]
    pub async fn stock(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Stock command. Available subcommands:\n\
            `/stock list` - Show tracked stock\n\
            `/stock in` - Receive stock\n\
            `/stock out` - Write off stock";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows tracked stock, flagging low items.
    #[poise::command(slash_command, rename = "list")]
    pub async fn stock_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        if !ensure_role(ctx, STAFF, "view stock").await? {
            return Ok(());
        }
        let db = &ctx.data().database;

        let items = inventory::get_inventory(db).await?;
        if items.is_empty() {
            ctx.say("No stock is being tracked. Use `/stock in` to start.")
                .await?;
            return Ok(());
        }
        let low = inventory::get_low_stock(db, DEFAULT_LOW_STOCK_THRESHOLD).await?;

        let fields: Vec<(String, String, bool)> = items
            .iter()
            .take(25) // Discord embed field limit
            .map(|item| {
                let flag = if low.iter().any(|l| l.id == item.id) {
                    " ⚠️ low"
                } else {
                    ""
                };
                (item.name.clone(), format!("{} cups{flag}", item.stock), true)
            })
            .collect();

        let embed = serenity::CreateEmbed::default()
            .title("**Stock**")
            .color(0x0014_6B33)
            .fields(fields)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} item(s) at or below {DEFAULT_LOW_STOCK_THRESHOLD}",
                low.len()
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Adds received cups to a drink's stock.
    #[poise::command(slash_command, rename = "in")]
    pub async fn stock_in(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Drink name"]
        #[autocomplete = "autocomplete::autocomplete_inventory_name"]
        name: String,
        #[description = "Cups received"]
        #[min = 1]
        quantity: i32,
    ) -> Result<()> {
        if !ensure_role(ctx, STAFF, "change stock").await? {
            return Ok(());
        }

        match inventory::stock_in(&ctx.data().database, &name, quantity).await {
            Ok(item) => {
                ctx.say(format!("📦 {} +{quantity} (now {}).", item.name, item.stock))
                    .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Removes cups from a drink's stock.
    #[poise::command(slash_command, rename = "out")]
    pub async fn stock_out(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Drink name"]
        #[autocomplete = "autocomplete::autocomplete_inventory_name"]
        name: String,
        #[description = "Cups to remove"]
        #[min = 1]
        quantity: i32,
    ) -> Result<()> {
        if !ensure_role(ctx, STAFF, "change stock").await? {
            return Ok(());
        }

        match inventory::stock_out(&ctx.data().database, &name, quantity).await {
            Ok(item) => {
                ctx.say(format!("📦 {} -{quantity} (now {}).", item.name, item.stock))
                    .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Parent command for account management.
    #[poise::command(
        slash_command,
        subcommands(
            "accounts_list",
            "accounts_add",
            "accounts_edit",
            "accounts_active",
            "accounts_delete"
        )
    )]
    pub async fn accounts(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Accounts command. Available subcommands:\n\
            `/accounts list` - Show all accounts\n\
            `/accounts add` - Create a cashier or customer account\n\
            `/accounts edit` - Change an account's username or role\n\
            `/accounts active` - Allow or block an account's logins\n\
            `/accounts delete` - Delete an account";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists every account.
    #[poise::command(slash_command, rename = "list")]
    pub async fn accounts_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        if !ensure_role(ctx, &[Role::Admin], "manage accounts").await? {
            return Ok(());
        }

        let accounts = account::list_accounts(&ctx.data().database).await?;
        let lines: Vec<String> = accounts
            .iter()
            .map(|a| {
                format!(
                    "`{}` **{}** · {} · {}{}",
                    a.id,
                    a.username,
                    a.role,
                    a.email.as_deref().unwrap_or("no email"),
                    if a.is_active { "" } else { " (inactive)" }
                )
            })
            .collect();

        let embed = serenity::CreateEmbed::default()
            .title(format!("**Accounts** ({})", accounts.len()))
            .color(0x0014_6B33)
            .description(lines.join("\n"));

        ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
            .await?;
        Ok(())
    }

    /// Creates a cashier or customer account.
    #[poise::command(slash_command, rename = "add")]
    pub async fn accounts_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Username"] username: String,
        #[description = "Password (at least 6 characters)"] password: String,
        #[description = "Role"] role: AccountRoleChoice,
    ) -> Result<()> {
        if !ensure_role(ctx, &[Role::Admin], "manage accounts").await? {
            return Ok(());
        }

        match account::create_account(&ctx.data().database, &username, &password, role.into()).await
        {
            Ok(created) => {
                ctx.send(
                    poise::CreateReply::default()
                        .content(format!(
                            "✅ Created {} account **{}** (#{}).",
                            created.role, created.username, created.id
                        ))
                        .ephemeral(true),
                )
                .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Changes an account's username and role.
    #[poise::command(slash_command, rename = "edit")]
    pub async fn accounts_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Account number from /accounts list"] id: i64,
        #[description = "New username"] username: String,
        #[description = "New role"] role: AccountRoleChoice,
    ) -> Result<()> {
        if !ensure_role(ctx, &[Role::Admin], "manage accounts").await? {
            return Ok(());
        }

        match account::update_account(&ctx.data().database, id, &username, role.into()).await {
            Ok(updated) => {
                ctx.say(format!(
                    "✅ Account #{} is now **{}** ({}).",
                    updated.id, updated.username, updated.role
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Allows or blocks logins for an account.
    #[poise::command(slash_command, rename = "active")]
    pub async fn accounts_active(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Account number from /accounts list"] id: i64,
        #[description = "Whether the account can log in"] active: bool,
    ) -> Result<()> {
        if !ensure_role(ctx, &[Role::Admin], "manage accounts").await? {
            return Ok(());
        }

        match account::set_active(&ctx.data().database, id, active).await {
            Ok(updated) => {
                let state = if updated.is_active { "can log in" } else { "is blocked from logging in" };
                ctx.say(format!("✅ **{}** {state}.", updated.username)).await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Deletes an account.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn accounts_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Account number from /accounts list"] id: i64,
    ) -> Result<()> {
        if !ensure_role(ctx, &[Role::Admin], "manage accounts").await? {
            return Ok(());
        }
        let data = ctx.data();

        match account::delete_account(&data.database, id).await {
            Ok(deleted) => {
                data.sessions.lock().await.retain(|_, account_id| *account_id != deleted.id);
                ctx.say(format!("🗑️ Deleted account **{}**.", deleted.username))
                    .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Parent command for store settings.
    #[poise::command(
        slash_command,
        subcommands("settings_show", "settings_general", "settings_notifications")
    )]
    pub async fn settings(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Settings command. Available subcommands:\n\
            `/settings show` - Show current settings\n\
            `/settings general` - Business name, currency and tax rate\n\
            `/settings notifications` - Notification preferences";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows the current store settings.
    #[poise::command(slash_command, rename = "show")]
    pub async fn settings_show(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        if !ensure_role(ctx, &[Role::Admin], "view settings").await? {
            return Ok(());
        }

        let current = settings::get_settings(&ctx.data().database).await?;
        let general = &current.general;
        let notifications = &current.notifications;
        let email = if notifications.notification_email.is_empty() {
            "not set".to_string()
        } else {
            notifications.notification_email.clone()
        };

        let embed = serenity::CreateEmbed::default()
            .title("**Settings**")
            .color(0x0014_6B33)
            .fields(vec![
                ("Business name", general.business_name.clone(), true),
                ("Currency", general.default_currency.clone(), true),
                ("Tax rate", format!("{}%", general.tax_rate), true),
                ("Low stock alerts", yes_no(notifications.low_stock).to_string(), true),
                ("New order alerts", yes_no(notifications.new_order).to_string(), true),
                (
                    "Daily sales report",
                    yes_no(notifications.daily_sales_report).to_string(),
                    true,
                ),
                ("Notification email", email, false),
            ]);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Changes the business name, currency or tax rate.
    #[poise::command(slash_command, rename = "general")]
    pub async fn settings_general(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Business name"] business_name: Option<String>,
        #[description = "Currency code (e.g., PHP)"] currency: Option<String>,
        #[description = "Tax rate in percent (0-100)"] tax_rate: Option<f64>,
    ) -> Result<()> {
        if !ensure_role(ctx, &[Role::Admin], "change settings").await? {
            return Ok(());
        }
        let db = &ctx.data().database;

        let current = settings::get_settings(db).await?.general;
        let general = GeneralSettings {
            business_name: business_name.unwrap_or(current.business_name),
            default_currency: currency.unwrap_or(current.default_currency),
            tax_rate: tax_rate.unwrap_or(current.tax_rate),
        };

        match settings::save_general(db, general).await {
            Ok(saved) => {
                ctx.say(format!(
                    "✅ Saved: {} · {} · {}% tax",
                    saved.general.business_name,
                    saved.general.default_currency,
                    saved.general.tax_rate
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Changes notification preferences.
    #[poise::command(slash_command, rename = "notifications")]
    pub async fn settings_notifications(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Alert when stock runs low"] low_stock: Option<bool>,
        #[description = "Alert on new orders"] new_order: Option<bool>,
        #[description = "Send a daily sales report"] daily_sales_report: Option<bool>,
        #[description = "Where notifications go (empty to clear)"] email: Option<String>,
    ) -> Result<()> {
        if !ensure_role(ctx, &[Role::Admin], "change settings").await? {
            return Ok(());
        }
        let db = &ctx.data().database;

        let current = settings::get_settings(db).await?.notifications;
        let notifications = NotificationSettings {
            low_stock: low_stock.unwrap_or(current.low_stock),
            new_order: new_order.unwrap_or(current.new_order),
            daily_sales_report: daily_sales_report.unwrap_or(current.daily_sales_report),
            notification_email: email.unwrap_or(current.notification_email),
        };

        match settings::save_notifications(db, notifications).await {
            Ok(_) => {
                ctx.say("✅ Notification settings saved.").await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }
}

// Re-export all commands
pub use inner::*;
