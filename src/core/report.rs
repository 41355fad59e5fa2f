//! Report formatting - receipts, order details and sales summaries.
//!
//! All functions are pure and return plain text that the bot layer can send
//! as-is or place inside an embed.

use crate::{
    core::{
        order::OrderWithItems,
        sales::{DailySales, SalesSummary},
    },
    entities::{Special, order_item},
};
use std::fmt::Write as _;

/// Symbol for a currency code. Unknown codes are used as a prefix.
#[must_use]
pub fn currency_symbol(currency: &str) -> String {
    match currency.to_uppercase().as_str() {
        "PHP" => "₱".to_string(),
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        other => format!("{other} "),
    }
}

/// Formats an amount like `₱193.13`.
#[must_use]
pub fn format_money(amount: f64, currency: &str) -> String {
    let symbol = currency_symbol(currency);
    if amount < 0.0 {
        format!("-{symbol}{:.2}", amount.abs())
    } else {
        format!("{symbol}{amount:.2}")
    }
}

/// One order line, e.g. `2x Lemon Cane (Tall, No Ice) ₱278.00`.
#[must_use]
pub fn format_order_line(item: &order_item::Model, currency: &str) -> String {
    let mut options = item.size.to_string();
    if item.special != Special::None {
        let _ = write!(options, ", {}", item.special);
    }

    let mut line = format!(
        "{}x {} ({options}) {}",
        item.quantity,
        item.name,
        format_money(item.line_total(), currency)
    );
    if !item.notes.is_empty() {
        let _ = write!(line, "\n   Note: {}", item.notes);
    }
    line
}

/// Full order details as shown to the cashier.
#[must_use]
pub fn format_order_details(details: &OrderWithItems, currency: &str) -> String {
    let order = &details.order;
    let mut text = format!(
        "Order {}\nCustomer: {}\n",
        order.id, order.customer_name
    );
    if let Some(phone) = &order.customer_phone {
        let _ = writeln!(text, "Phone: {phone}");
    }
    let _ = writeln!(
        text,
        "Date: {}\nStatus: {}\n",
        order.created_at.format("%Y-%m-%d %H:%M UTC"),
        order.status
    );

    for item in &details.items {
        let _ = writeln!(text, "{}", format_order_line(item, currency));
    }

    let _ = write!(
        text,
        "\nSubtotal: {}\nTax ({:.1}%): {}\nTotal: {}",
        format_money(order.subtotal, currency),
        order.tax_rate * 100.0,
        format_money(order.tax, currency),
        format_money(order.total, currency)
    );
    if let Some(notes) = &order.notes {
        let _ = write!(text, "\nNotes: {notes}");
    }
    text
}

/// Sales summary text.
#[must_use]
pub fn format_sales_summary(summary: &SalesSummary, currency: &str) -> String {
    let since = summary.last_reset.map_or_else(
        || "the beginning".to_string(),
        |at| at.format("%Y-%m-%d %H:%M UTC").to_string(),
    );
    format!(
        "Total sales: {}\nTotal orders: {}\nPending: {}\nApproved: {}\nSince: {since}",
        format_money(summary.total_sales, currency),
        summary.total_orders,
        summary.pending_orders,
        summary.approved_orders
    )
}

/// Text bar scaled against the best day, like `[█████░░░░░]`.
#[must_use]
pub fn format_sales_bar(revenue: f64, best: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let ratio = if best > 0.0 {
        (revenue / best).clamp(0.0, 1.0)
    } else {
        0.0
    };

    // ratio is in [0, 1] and length is small, so the cast cannot truncate meaningfully.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = (ratio * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// One line per day with a revenue bar.
#[must_use]
pub fn format_daily_sales(days: &[DailySales], currency: &str) -> String {
    let best = days.iter().map(|day| day.revenue).fold(0.0, f64::max);
    days.iter()
        .map(|day| {
            format!(
                "{} {} {} ({} orders)",
                day.date.format("%m-%d"),
                format_sales_bar(day.revenue, best, None),
                format_money(day.revenue, currency),
                day.orders
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
