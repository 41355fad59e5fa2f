//! Menu Discord commands - `menu` for everyone and `menu_manage` for admins.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, ensure_role, handlers::autocomplete, reply_error},
        core::{
            menu::{self, MenuItemInput},
            report, settings, sync,
        },
        entities::{DrinkSize, Role},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Shows the drink menu with Regular and Tall prices.
    #[poise::command(slash_command)]
    pub async fn menu(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let drinks = sync::get_customer_menu(db).await?;
        let settings = settings::get_settings(db).await?;
        let currency = &settings.general.default_currency;

        if drinks.is_empty() {
            ctx.say("The menu is empty right now. Please check back later.")
                .await?;
            return Ok(());
        }

        let fields: Vec<(String, String, bool)> = drinks
            .iter()
            .take(25) // Discord embed field limit
            .map(|drink| {
                (
                    drink.name.clone(),
                    format!(
                        "Regular {} · Tall {}\n{}",
                        report::format_money(drink.price_regular, currency),
                        report::format_money(drink.price_for(DrinkSize::Tall), currency),
                        drink.description
                    ),
                    false,
                )
            })
            .collect();

        let embed = serenity::CreateEmbed::default()
            .title(format!("**{} Menu**", settings.general.business_name))
            .color(0x0014_6B33)
            .fields(fields)
            .footer(serenity::CreateEmbedFooter::new(
                "No Ice adds 20 per cup. Use /cart add to order.",
            ));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Parent command for editing the drink catalog.
    #[poise::command(
        slash_command,
        subcommands("menu_add", "menu_update", "menu_delete", "menu_sync")
    )]
    pub async fn menu_manage(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Menu management command. Available subcommands:\n\
            `/menu_manage add` - Add a drink\n\
            `/menu_manage update` - Change a drink\n\
            `/menu_manage delete` - Remove a drink\n\
            `/menu_manage sync` - Publish the menu to customers";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Adds a drink to the catalog and publishes the menu.
    #[poise::command(slash_command, rename = "add")]
    pub async fn menu_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Drink name (e.g., 'Mint Cane')"] name: String,
        #[description = "Price of a Regular cup"] price_regular: f64,
        #[description = "Price of a Tall cup"] price_tall: f64,
        #[description = "Short description"] description: Option<String>,
        #[description = "Image path or URL"] image: Option<String>,
    ) -> Result<()> {
        if !ensure_role(ctx, &[Role::Admin], "edit the menu").await? {
            return Ok(());
        }
        let data = ctx.data();
        let input = MenuItemInput {
            name,
            description: description.unwrap_or_default(),
            price_regular,
            price_tall,
            image,
        };

        match menu::create_menu_item(&data.database, input).await {
            Ok(item) => {
                sync::sync_customer_menu(&data.database, &data.config.menu).await?;
                ctx.say(format!(
                    "✅ Added **{}** (#{}) and published the menu.",
                    item.name, item.id
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Changes a drink's name, prices or description.
    #[poise::command(slash_command, rename = "update")]
    pub async fn menu_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Drink to change"]
        #[autocomplete = "autocomplete::autocomplete_menu_item_name"]
        name: String,
        #[description = "New price of a Regular cup"] price_regular: Option<f64>,
        #[description = "New price of a Tall cup"] price_tall: Option<f64>,
        #[description = "New name"] new_name: Option<String>,
        #[description = "New description"] description: Option<String>,
        #[description = "New image path or URL"] image: Option<String>,
    ) -> Result<()> {
        if !ensure_role(ctx, &[Role::Admin], "edit the menu").await? {
            return Ok(());
        }
        let data = ctx.data();

        let Some(item) = menu::get_menu_item_by_name(&data.database, &name).await? else {
            ctx.say(format!("❌ Drink '{name}' not found.")).await?;
            return Ok(());
        };

        let input = MenuItemInput {
            name: new_name.unwrap_or_else(|| item.name.clone()),
            description: description.unwrap_or_else(|| item.description.clone()),
            price_regular: price_regular.unwrap_or(item.price_regular),
            price_tall: price_tall.unwrap_or(item.price_tall),
            image,
        };

        match menu::update_menu_item(&data.database, item.id, input).await {
            Ok(updated) => {
                sync::sync_customer_menu(&data.database, &data.config.menu).await?;
                ctx.say(format!(
                    "✅ Updated **{}**: Regular {:.2}, Tall {:.2}.",
                    updated.name, updated.price_regular, updated.price_tall
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }

    /// Removes a drink from the menu.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn menu_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Drink to remove"]
        #[autocomplete = "autocomplete::autocomplete_menu_item_name"]
        name: String,
    ) -> Result<()> {
        if !ensure_role(ctx, &[Role::Admin], "edit the menu").await? {
            return Ok(());
        }
        let data = ctx.data();

        let Some(item) = menu::get_menu_item_by_name(&data.database, &name).await? else {
            ctx.say(format!("❌ Drink '{name}' not found.")).await?;
            return Ok(());
        };

        menu::delete_menu_item(&data.database, item.id).await?;
        sync::sync_customer_menu(&data.database, &data.config.menu).await?;
        ctx.say(format!("✅ **{}** has been removed from the menu.", item.name))
            .await?;
        Ok(())
    }

    /// Merges the catalog with the default drinks and publishes it.
    #[poise::command(slash_command, rename = "sync")]
    pub async fn menu_sync(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Optional legacy menu export (JSON file)"] legacy_export: Option<
            serenity::Attachment,
        >,
    ) -> Result<()> {
        if !ensure_role(ctx, &[Role::Admin], "sync the menu").await? {
            return Ok(());
        }
        let data = ctx.data();

        let result = if let Some(attachment) = legacy_export {
            let bytes = attachment.download().await?;
            let json = String::from_utf8_lossy(&bytes);
            sync::import_legacy_menu(&data.database, &data.config.menu, &json).await
        } else {
            sync::sync_customer_menu(&data.database, &data.config.menu).await
        };

        match result {
            Ok(report) => {
                ctx.say(format!(
                    "✅ Menu synced: {} drinks available ({} added, {} changed).",
                    report.published, report.inserted, report.updated
                ))
                .await?;
                Ok(())
            }
            Err(e) => reply_error(ctx, e).await,
        }
    }
}

// Re-export all commands
pub use inner::*;
