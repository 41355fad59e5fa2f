//! Autocomplete handlers for Discord slash command parameters.

use crate::{
    bot::BotData,
    core::{inventory, menu, sync},
    errors::Error,
};

fn matching_names(names: impl Iterator<Item = String>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = names
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .take(25) // Discord autocomplete limit
        .collect();

    matching.sort();
    matching
}

/// Suggests drinks from the published customer menu.
pub async fn autocomplete_drink_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(drinks) = sync::get_customer_menu(&ctx.data().database).await else {
        return Vec::new();
    };
    matching_names(drinks.into_iter().map(|drink| drink.name), partial)
}

/// Suggests drinks from the admin catalog, including ones not yet synced.
pub async fn autocomplete_menu_item_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(items) = menu::get_all_active_menu_items(&ctx.data().database).await else {
        return Vec::new();
    };
    matching_names(items.into_iter().map(|item| item.name), partial)
}

/// Suggests tracked inventory items.
pub async fn autocomplete_inventory_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(items) = inventory::get_inventory(&ctx.data().database).await else {
        return Vec::new();
    };
    matching_names(items.into_iter().map(|item| item.name), partial)
}
