//! Order queue and sales Discord commands.
//! Customers see their own orders; cashiers and admins work the whole queue.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, ensure_role, reply_error},
        core::{order, report, sales, settings},
        entities::{OrderStatus, Role},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use tracing::info;

    const STAFF: &[Role] = &[Role::Admin, Role::Cashier];
    const MAX_LISTED_ORDERS: usize = 20;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum StatusChoice {
        Pending,
        Approved,
        Preparing,
        Ready,
        Completed,
    }

    impl From<StatusChoice> for OrderStatus {
        fn from(choice: StatusChoice) -> Self {
            match choice {
                StatusChoice::Pending => Self::Pending,
                StatusChoice::Approved => Self::Approved,
                StatusChoice::Preparing => Self::Preparing,
                StatusChoice::Ready => Self::Ready,
                StatusChoice::Completed => Self::Completed,
            }
        }
    }

    /// Lists orders. Staff see every order, customers see their own.
    #[poise::command(slash_command)]
    pub async fn orders(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only show orders with this status"] status: Option<StatusChoice>,
    ) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.get();
        let role = data.role_of(user_id).await?;
        let status = status.map(OrderStatus::from);

        let all_orders = order::list_orders(&data.database, None).await?;
        let shown = if STAFF.contains(&role) {
            match status {
                Some(status) => order::list_orders(&data.database, Some(status)).await?,
                None => all_orders.clone(),
            }
        } else {
            let Some(account) = data.session(user_id).await? else {
                ctx.say("Log in with `/login` to see your orders.").await?;
                return Ok(());
            };
            order::list_orders_for_customer(&data.database, &account.username)
                .await?
                .into_iter()
                .filter(|o| status.is_none_or(|s| o.status == s))
                .collect()
        };

        if shown.is_empty() {
            ctx.say("No orders found.").await?;
            return Ok(());
        }

        let currency = settings::get_settings(&data.database)
            .await?
            .general
            .default_currency;
        let lines: Vec<String> = shown
            .iter()
            .take(MAX_LISTED_ORDERS)
            .map(|o| {
                let number = order::display_number(&all_orders, &o.id).unwrap_or_default();
                format!(
                    "`#{number}` **{}** · {} · {} · {}",
                    o.id,
                    o.customer_name,
                    o.status,
                    report::format_money(o.total, &currency)
                )
            })
            .collect();

        let mut embed = serenity::CreateEmbed::default()
            .title("**Orders**")
            .color(0x0014_6B33)
            .description(lines.join("\n"));
        if shown.len() > MAX_LISTED_ORDERS {
            embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
                "Showing {MAX_LISTED_ORDERS} of {} orders",
                shown.len()
            )));
        }

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Parent command for working the order queue.
    #[poise::command(
        slash_command,
        subcommands(
            "order_approve",
            "order_advance",
            "order_cancel",
            "order_details",
            "order_clear"
        )
    )]
    pub async fn order(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Order queue command. Available subcommands:\n\
            `/order approve` - Approve a pending order\n\
            `/order advance` - Move an order to its next stage\n\
            `/order cancel` - Cancel a pending order\n\
            `/order details` - Show an order's items and totals\n\
            `/order clear` - Delete all orders and reset sales";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Approves a pending order and deducts stock.
    #[poise::command(slash_command, rename = "approve")]
    pub async fn order_approve(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order id (e.g., ORD-001)"] id: String,
    ) -> Result<()> {
        if !ensure_role(ctx, STAFF, "approve orders").await? {
            return Ok(());
        }

        match order::approve_order(&ctx.data().database, &id).await {
            Ok(approved) => {
                ctx.say(format!("✅ Order **{}** approved.", approved.id)).await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Moves an approved order to preparing, ready, then completed.
    #[poise::command(slash_command, rename = "advance")]
    pub async fn order_advance(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order id (e.g., ORD-001)"] id: String,
    ) -> Result<()> {
        if !ensure_role(ctx, STAFF, "update orders").await? {
            return Ok(());
        }

        match order::advance_order(&ctx.data().database, &id).await {
            Ok(updated) => {
                ctx.say(format!("✅ Order **{}** is now {}.", updated.id, updated.status))
                    .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Cancels a pending order.
    #[poise::command(slash_command, rename = "cancel")]
    pub async fn order_cancel(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order id (e.g., ORD-001)"] id: String,
    ) -> Result<()> {
        if !ensure_role(ctx, STAFF, "cancel orders").await? {
            return Ok(());
        }

        match order::cancel_order(&ctx.data().database, &id).await {
            Ok(cancelled) => {
                ctx.say(format!("🗑️ Order **{}** cancelled.", cancelled.id)).await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Shows an order's items and totals.
    #[poise::command(slash_command, rename = "details")]
    pub async fn order_details(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Order id (e.g., ORD-001)"] id: String,
    ) -> Result<()> {
        if !ensure_role(ctx, STAFF, "view order details").await? {
            return Ok(());
        }
        let data = ctx.data();

        let Some(details) = order::get_order(&data.database, &id).await? else {
            ctx.say(format!("❌ Order '{id}' not found.")).await?;
            return Ok(());
        };
        let currency = settings::get_settings(&data.database)
            .await?
            .general
            .default_currency;

        ctx.say(format!(
            "```\n{}\n```",
            report::format_order_details(&details, &currency)
        ))
        .await?;
        Ok(())
    }

    /// Deletes every order and resets the sales counters.
    #[poise::command(slash_command, rename = "clear")]
    pub async fn order_clear(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Type CLEAR to confirm"] confirm: String,
    ) -> Result<()> {
        if !ensure_role(ctx, STAFF, "clear orders").await? {
            return Ok(());
        }
        if confirm.trim() != "CLEAR" {
            ctx.say("❌ Type `CLEAR` to confirm deleting every order.").await?;
            return Ok(());
        }

        let removed = order::clear_all_orders(&ctx.data().database).await?;
        info!("{} cleared {} orders", ctx.author().name, removed);
        ctx.say(format!("🗑️ Removed {removed} orders. Sales have been reset."))
            .await?;
        Ok(())
    }

    /// Parent command for sales reports.
    #[poise::command(slash_command, subcommands("sales_show", "sales_reset"))]
    pub async fn sales(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Sales command. Available subcommands:\n\
            `/sales show` - Sales summary and daily revenue\n\
            `/sales reset` - Start counting sales from now";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows the sales summary and revenue for recent days.
    #[poise::command(slash_command, rename = "show")]
    pub async fn sales_show(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Number of days to chart (default 7)"]
        #[min = 1]
        #[max = 31]
        days: Option<u32>,
    ) -> Result<()> {
        if !ensure_role(ctx, STAFF, "view sales").await? {
            return Ok(());
        }
        let data = ctx.data();

        let summary = sales::get_sales_summary(&data.database).await?;
        let daily = sales::daily_sales(&data.database, days.unwrap_or(7)).await?;
        let currency = settings::get_settings(&data.database)
            .await?
            .general
            .default_currency;

        let embed = serenity::CreateEmbed::default()
            .title("**Sales**")
            .color(0x0014_6B33)
            .fields(vec![
                ("Summary", report::format_sales_summary(&summary, &currency), false),
                (
                    "Daily revenue",
                    format!("```\n{}\n```", report::format_daily_sales(&daily, &currency)),
                    false,
                ),
            ]);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Starts counting sales from now. Orders are kept.
    #[poise::command(slash_command, rename = "reset")]
    pub async fn sales_reset(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        if !ensure_role(ctx, STAFF, "reset sales").await? {
            return Ok(());
        }

        let at = sales::reset_sales(&ctx.data().database).await?;
        ctx.say(format!(
            "✅ Sales reset at {}.",
            at.format("%Y-%m-%d %H:%M UTC")
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
