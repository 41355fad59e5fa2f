//! Cart and checkout Discord commands.
//! Each Discord user has one in-memory cart held in [`BotData::carts`](crate::bot::BotData).

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete, reply_error},
        core::{
            account,
            cart::Cart,
            order::{self, CustomerInfo},
            report, settings, sync,
        },
        entities::{DrinkSize, Special},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;
    use tracing::info;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum SizeChoice {
        Regular,
        Tall,
    }

    impl From<SizeChoice> for DrinkSize {
        fn from(choice: SizeChoice) -> Self {
            match choice {
                SizeChoice::Regular => Self::Regular,
                SizeChoice::Tall => Self::Tall,
            }
        }
    }

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum SpecialChoice {
        None,
        #[name = "No Ice"]
        NoIce,
    }

    impl From<SpecialChoice> for Special {
        fn from(choice: SpecialChoice) -> Self {
            match choice {
                SpecialChoice::None => Self::None,
                SpecialChoice::NoIce => Self::NoIce,
            }
        }
    }

    /// Parent command for the caller's cart.
    #[poise::command(
        slash_command,
        subcommands(
            "cart_add",
            "cart_show",
            "cart_increase",
            "cart_decrease",
            "cart_remove",
            "cart_clear"
        )
    )]
    pub async fn cart(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Cart command. Available subcommands:\n\
            `/cart add` - Add a drink\n\
            `/cart show` - Show your cart\n\
            `/cart increase` / `/cart decrease` - Change a line's quantity\n\
            `/cart remove` - Remove a line\n\
            `/cart clear` - Empty your cart";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a drink to your cart.
    #[poise::command(slash_command, rename = "add")]
    pub async fn cart_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Drink to add"]
        #[autocomplete = "autocomplete::autocomplete_drink_name"]
        drink: String,
        #[description = "Cup size (default Regular)"] size: Option<SizeChoice>,
        #[description = "Special instruction (No Ice adds 20)"] special: Option<SpecialChoice>,
        #[description = "Note for the cashier"] notes: Option<String>,
        #[description = "Number of cups (default 1)"]
        #[min = 1]
        #[max = 999]
        quantity: Option<u32>,
    ) -> Result<()> {
        let data = ctx.data();
        let drinks = sync::get_customer_menu(&data.database).await?;
        let wanted = drink.trim().to_lowercase();
        let Some(entry) = drinks.iter().find(|d| d.name.to_lowercase() == wanted) else {
            ctx.say(format!("❌ '{drink}' is not on the menu.")).await?;
            return Ok(());
        };

        let added = {
            let mut carts = data.carts.lock().await;
            let cart = carts.entry(ctx.author().id.get()).or_default();
            let result = if size.is_none() && special.is_none() && notes.is_none() && quantity.is_none() {
                cart.quick_add(entry)
            } else {
                cart.add(
                    entry,
                    size.map_or(DrinkSize::Regular, Into::into),
                    special.map_or(Special::None, Into::into),
                    notes.as_deref().unwrap_or_default(),
                    quantity.unwrap_or(1),
                )
            };
            result.cloned()
        };

        match added {
            Ok(line) => {
                ctx.say(format!(
                    "🛒 Line #{}: {} × {} ({}, {}) - {:.2} each",
                    line.line_id, line.quantity, line.name, line.size, line.special, line.unit_price
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Shows your cart with subtotal, tax and total.
    #[poise::command(slash_command, rename = "show")]
    pub async fn cart_show(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let cart: Cart = data
            .carts
            .lock()
            .await
            .get(&ctx.author().id.get())
            .cloned()
            .unwrap_or_default();

        if cart.is_empty() {
            ctx.say("Your cart is empty. Use `/cart add` to pick a drink.")
                .await?;
            return Ok(());
        }

        let settings = settings::get_settings(&data.database).await?;
        let currency = &settings.general.default_currency;
        let subtotal = cart.subtotal();
        let (tax, total) = order::compute_totals(subtotal, settings.tax_fraction());

        let mut lines = String::new();
        for line in cart.lines() {
            let _ = write!(
                lines,
                "`#{}` {} × {} ({}",
                line.line_id, line.quantity, line.name, line.size
            );
            if line.special != Special::None {
                let _ = write!(lines, ", {}", line.special);
            }
            let _ = write!(lines, ") - {}", report::format_money(line.line_total(), currency));
            if !line.notes.is_empty() {
                let _ = write!(lines, "\n  _{}_", line.notes);
            }
            lines.push('\n');
        }

        let embed = serenity::CreateEmbed::default()
            .title(format!("**Your Cart** ({} cups)", cart.item_count()))
            .color(0x0014_6B33)
            .description(lines)
            .fields(vec![
                ("Subtotal", report::format_money(subtotal, currency), true),
                (
                    "Tax",
                    format!(
                        "{} ({}%)",
                        report::format_money(tax, currency),
                        settings.general.tax_rate
                    ),
                    true,
                ),
                ("Total", report::format_money(total, currency), true),
            ]);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Adds one cup to a cart line.
    #[poise::command(slash_command, rename = "increase")]
    pub async fn cart_increase(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Line number from /cart show"] line: u64,
    ) -> Result<()> {
        let result = {
            let mut carts = ctx.data().carts.lock().await;
            carts.entry(ctx.author().id.get()).or_default().increase(line)
        };
        match result {
            Ok(quantity) => {
                ctx.say(format!("Line #{line} now has {quantity} cups.")).await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Takes one cup off a cart line.
    #[poise::command(slash_command, rename = "decrease")]
    pub async fn cart_decrease(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Line number from /cart show"] line: u64,
    ) -> Result<()> {
        let result = {
            let mut carts = ctx.data().carts.lock().await;
            carts.entry(ctx.author().id.get()).or_default().decrease(line)
        };
        match result {
            Ok(0) => {
                ctx.say(format!("Line #{line} removed from your cart.")).await?;
                Ok(())
            }
            Ok(quantity) => {
                ctx.say(format!("Line #{line} now has {quantity} cups.")).await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Removes a line from your cart.
    #[poise::command(slash_command, rename = "remove")]
    pub async fn cart_remove(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Line number from /cart show"] line: u64,
    ) -> Result<()> {
        let result = {
            let mut carts = ctx.data().carts.lock().await;
            carts.entry(ctx.author().id.get()).or_default().remove(line)
        };
        match result {
            Ok(removed) => {
                ctx.say(format!("Removed {} × {} from your cart.", removed.quantity, removed.name))
                    .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Empties your cart.
    #[poise::command(slash_command, rename = "clear")]
    pub async fn cart_clear(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        if let Some(cart) = ctx.data().carts.lock().await.get_mut(&ctx.author().id.get()) {
            cart.clear();
        }
        ctx.say("Your cart is now empty.").await?;
        Ok(())
    }

    /// Places an order for everything in your cart.
    #[poise::command(slash_command)]
    pub async fn checkout(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name for the order (defaults to your account name)"] name: Option<String>,
        #[description = "Contact number"] phone: Option<String>,
        #[description = "Note for the whole order"] notes: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.get();
        let session = data.session(user_id).await?;

        let phone = match phone {
            Some(raw) => match account::normalize_phone(&raw) {
                Some(normalized) => Some(normalized),
                None => {
                    ctx.say(format!("❌ Invalid phone number: {raw}")).await?;
                    return Ok(());
                }
            },
            None => session.as_ref().and_then(|s| s.phone.clone()),
        };

        let customer = CustomerInfo {
            name: name
                .or_else(|| session.as_ref().map(|s| s.name.clone()))
                .or_else(|| Some(ctx.author().name.clone())),
            username: session.as_ref().map(|s| s.username.clone()),
            email: session.as_ref().and_then(|s| s.email.clone()),
            phone,
            notes,
        };

        let cart = data.take_cart(user_id).await;
        match order::place_order(&data.database, &cart, customer).await {
            Ok(placed) => {
                info!("Order {} placed by Discord user {}", placed.order.id, user_id);

                let settings = settings::get_settings(&data.database).await?;
                ctx.say(format!(
                    "✅ Order placed! A cashier will approve it shortly.\n```\n{}\n```",
                    report::format_order_details(&placed, &settings.general.default_currency)
                ))
                .await?;
                Ok(())
            }
            Err(e) => {
                data.restore_cart(user_id, cart).await;
                reply_error(ctx, e).await
            }
        }
    }
}

// Re-export all commands
pub use inner::*;
