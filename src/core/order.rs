//! Order business logic - checkout and the order lifecycle.
//!
//! Orders move `pending → approved → preparing → ready → completed`. Only
//! pending orders can be cancelled, and cancelling removes them. Approval
//! deducts tracked inventory in the same transaction that changes the
//! status, so a failed deduction leaves the order pending.

use crate::{
    core::{cart::Cart, inventory, sales, settings},
    entities::{Order, OrderItem, OrderStatus, order, order_item},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Name used when the customer gives none
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

/// Who is ordering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerInfo {
    /// `None` means a walk-in customer
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Notes for the whole order
    pub notes: Option<String>,
}

/// An order with its line items
#[derive(Debug, Clone, PartialEq)]
pub struct OrderWithItems {
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

/// Rounds to whole cents.
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Tax and total for a subtotal at the given rate (a fraction).
///
/// Both are rounded separately from the unrounded product, so `tax + subtotal`
/// can differ from `total` by a cent.
#[must_use]
pub fn compute_totals(subtotal: f64, tax_rate: f64) -> (f64, f64) {
    (
        round_cents(subtotal * tax_rate),
        round_cents(subtotal * (1.0 + tax_rate)),
    )
}

/// Trailing run of digits of an order id (`"ORD-042"` → 42, `"17"` → 17).
#[must_use]
pub fn parse_order_number(id: &str) -> Option<u32> {
    let digits_start = id
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(index, _)| index)?;
    id[digits_start..].parse().ok()
}

/// Formats an order number as `ORD-NNN`.
#[must_use]
pub fn format_order_id(number: u32) -> String {
    format!("ORD-{number:03}")
}

/// Next order id: one past the highest trailing number among existing ids.
pub async fn next_order_id<C>(db: &C) -> Result<String>
where
    C: ConnectionTrait,
{
    let ids: Vec<String> = Order::find()
        .select_only()
        .column(order::Column::Id)
        .into_tuple()
        .all(db)
        .await?;

    let highest = ids
        .iter()
        .filter_map(|id| parse_order_number(id))
        .max()
        .unwrap_or(0);
    Ok(format_order_id(highest + 1))
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Places an order for everything in the cart at the current tax rate.
///
/// The cart itself is not cleared; the caller does that once the order is
/// stored.
///
/// # Errors
/// Returns an error if:
/// - The cart is empty
/// - A customer name is given but blank
/// - The database transaction fails
pub async fn place_order(
    db: &DatabaseConnection,
    cart: &Cart,
    customer: CustomerInfo,
) -> Result<OrderWithItems> {
    if cart.is_empty() {
        return Err(Error::EmptyCart);
    }
    let customer_name = match customer.name {
        None => WALK_IN_CUSTOMER.to_string(),
        Some(name) if name.trim().is_empty() => {
            return Err(Error::validation("Customer name cannot be blank"));
        }
        Some(name) => name.trim().to_string(),
    };

    let tax_rate = settings::get_settings(db).await?.tax_fraction();
    let subtotal = round_cents(cart.subtotal());
    let (tax, total) = compute_totals(subtotal, tax_rate);
    let now = Utc::now();

    let txn = db.begin().await?;
    let id = next_order_id(&txn).await?;

    let order = order::ActiveModel {
        id: Set(id.clone()),
        customer_name: Set(customer_name),
        customer_username: Set(clean(customer.username)),
        customer_email: Set(clean(customer.email)),
        customer_phone: Set(clean(customer.phone)),
        notes: Set(clean(customer.notes)),
        subtotal: Set(subtotal),
        tax: Set(tax),
        total: Set(total),
        tax_rate: Set(tax_rate),
        status: Set(OrderStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(cart.lines().len());
    for line in cart.lines() {
        let item = order_item::ActiveModel {
            order_id: Set(id.clone()),
            menu_item_id: Set(Some(line.menu_item_id)),
            name: Set(line.name.clone()),
            size: Set(line.size),
            special: Set(line.special),
            notes: Set(line.notes.clone()),
            quantity: Set(i32::try_from(line.quantity)?),
            unit_price: Set(line.unit_price),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        items.push(item);
    }

    txn.commit().await?;

    info!(
        "Order {} placed by {}: {} items, total {:.2}",
        order.id,
        order.customer_name,
        cart.item_count(),
        order.total
    );
    Ok(OrderWithItems { order, items })
}

/// Line items of an order, in insertion order.
pub async fn get_order_items<C>(db: &C, order_id: &str) -> Result<Vec<order_item::Model>>
where
    C: ConnectionTrait,
{
    OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn require_order<C>(db: &C, order_id: &str) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id.trim().to_uppercase())
        .one(db)
        .await?
        .ok_or_else(|| Error::OrderNotFound {
            id: order_id.to_string(),
        })
}

/// Retrieves an order with its items. Ids are matched case-insensitively.
pub async fn get_order(db: &DatabaseConnection, order_id: &str) -> Result<Option<OrderWithItems>> {
    let Some(order) = Order::find_by_id(order_id.trim().to_uppercase())
        .one(db)
        .await?
    else {
        return Ok(None);
    };
    let items = get_order_items(db, &order.id).await?;
    Ok(Some(OrderWithItems { order, items }))
}

/// All orders, newest first, optionally limited to one status.
pub async fn list_orders(
    db: &DatabaseConnection,
    status: Option<OrderStatus>,
) -> Result<Vec<order::Model>> {
    let mut query = Order::find();
    if let Some(status) = status {
        query = query.filter(order::Column::Status.eq(status));
    }
    query
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Orders placed by one account, newest first.
pub async fn list_orders_for_customer(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::CustomerUsername.eq(username))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn set_status<C>(db: &C, order: order::Model, status: OrderStatus) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    let mut active: order::ActiveModel = order.into();
    active.status = Set(status);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Approves a pending order and deducts its cups from tracked stock.
///
/// # Errors
/// Returns an error if the order does not exist, is not pending, or a
/// tracked drink lacks stock.
pub async fn approve_order(db: &DatabaseConnection, order_id: &str) -> Result<order::Model> {
    let txn = db.begin().await?;
    let order = require_order(&txn, order_id).await?;
    if order.status != OrderStatus::Pending {
        return Err(Error::InvalidTransition {
            id: order.id,
            from: order.status.to_string(),
            to: OrderStatus::Approved.to_string(),
        });
    }

    let items = get_order_items(&txn, &order.id).await?;
    inventory::deduct_for_items(&txn, &items).await?;
    let approved = set_status(&txn, order, OrderStatus::Approved).await?;
    txn.commit().await?;

    info!("Order {} approved ({:.2})", approved.id, approved.total);
    Ok(approved)
}

/// Moves an approved order one step toward completion.
pub async fn advance_order(db: &DatabaseConnection, order_id: &str) -> Result<order::Model> {
    let order = require_order(db, order_id).await?;
    let Some(next) = order.status.next() else {
        return Err(Error::InvalidTransition {
            id: order.id,
            from: order.status.to_string(),
            to: "next stage".to_string(),
        });
    };

    let updated = set_status(db, order, next).await?;
    info!("Order {} is now {}", updated.id, updated.status);
    Ok(updated)
}

/// Cancels a pending order, removing it and its items.
pub async fn cancel_order(db: &DatabaseConnection, order_id: &str) -> Result<order::Model> {
    let txn = db.begin().await?;
    let order = require_order(&txn, order_id).await?;
    if order.status != OrderStatus::Pending {
        return Err(Error::InvalidTransition {
            id: order.id,
            from: order.status.to_string(),
            to: "cancelled".to_string(),
        });
    }

    OrderItem::delete_many()
        .filter(order_item::Column::OrderId.eq(order.id.as_str()))
        .exec(&txn)
        .await?;
    Order::delete_by_id(order.id.clone()).exec(&txn).await?;
    txn.commit().await?;

    info!("Order {} cancelled", order.id);
    Ok(order)
}

/// Deletes every order and records a sales reset. Returns the orders removed.
pub async fn clear_all_orders(db: &DatabaseConnection) -> Result<u64> {
    let txn = db.begin().await?;
    OrderItem::delete_many().exec(&txn).await?;
    let removed = Order::delete_many().exec(&txn).await?.rows_affected;
    sales::record_reset(&txn, Utc::now()).await?;
    txn.commit().await?;

    info!("Cleared {} orders and reset sales", removed);
    Ok(removed)
}

/// 1-based chronological position of an order, padded to three digits.
///
/// This is the short number cashiers call out, independent of the order id.
#[must_use]
pub fn display_number(orders: &[order::Model], order_id: &str) -> Option<String> {
    let mut sorted: Vec<&order::Model> = orders.iter().collect();
    sorted.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    sorted
        .iter()
        .position(|order| order.id == order_id)
        .map(|index| format!("{:03}", index + 1))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::{DrinkSize, Special};
    use crate::test_utils::{cart_with, seeded_test_db, setup_test_db};

    #[test]
    fn test_compute_totals_rounds_to_cents() {
        let (tax, total) = compute_totals(100.0, 0.085);
        assert_eq!(tax, 8.5);
        assert_eq!(total, 108.5);

        let (tax, total) = compute_totals(178.0, 0.085);
        assert_eq!(tax, 15.13);
        assert_eq!(total, 193.13);

        let (tax, total) = compute_totals(0.0, 0.085);
        assert_eq!(tax, 0.0);
        assert_eq!(total, 0.0);
    }

    #[test]
    fn test_parse_order_number() {
        assert_eq!(parse_order_number("ORD-042"), Some(42));
        assert_eq!(parse_order_number("17"), Some(17));
        assert_eq!(parse_order_number("ORD-1000"), Some(1000));
        assert_eq!(parse_order_number("ORD-"), None);
        assert_eq!(parse_order_number("1699999-abc"), None);
        assert_eq!(format_order_id(7), "ORD-007");
        assert_eq!(format_order_id(1234), "ORD-1234");
    }

    #[tokio::test]
    async fn test_place_order_computes_totals() -> Result<()> {
        let db = seeded_test_db().await?;
        let cart = cart_with(&db, &[("Lemon Cane", DrinkSize::Regular, Special::None, 2)]).await?;

        let placed = place_order(&db, &cart, CustomerInfo::default()).await?;
        assert_eq!(placed.order.id, "ORD-001");
        assert_eq!(placed.order.customer_name, WALK_IN_CUSTOMER);
        assert_eq!(placed.order.subtotal, 178.0);
        assert_eq!(placed.order.tax, 15.13);
        assert_eq!(placed.order.total, 193.13);
        assert_eq!(placed.order.status, OrderStatus::Pending);
        assert_eq!(placed.items.len(), 1);

        let second = place_order(&db, &cart, CustomerInfo::default()).await?;
        assert_eq!(second.order.id, "ORD-002");
        Ok(())
    }

    #[tokio::test]
    async fn test_place_order_rejects_empty_cart_and_blank_name() -> Result<()> {
        let db = seeded_test_db().await?;
        let result = place_order(&db, &Cart::new(), CustomerInfo::default()).await;
        assert!(matches!(result, Err(Error::EmptyCart)));

        let cart = cart_with(&db, &[("Lemon Cane", DrinkSize::Tall, Special::NoIce, 2)]).await?;
        let customer = CustomerInfo {
            name: Some("   ".to_string()),
            ..CustomerInfo::default()
        };
        let result = place_order(&db, &cart, customer).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(list_orders(&db, None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_next_order_id_follows_highest_number() -> Result<()> {
        let db = setup_test_db().await?;
        assert_eq!(next_order_id(&db).await?, "ORD-001");

        let now = Utc::now();
        for id in ["ORD-009", "41"] {
            order::ActiveModel {
                id: Set(id.to_string()),
                customer_name: Set("Legacy".to_string()),
                customer_username: Set(None),
                customer_email: Set(None),
                customer_phone: Set(None),
                notes: Set(None),
                subtotal: Set(0.0),
                tax: Set(0.0),
                total: Set(0.0),
                tax_rate: Set(0.085),
                status: Set(OrderStatus::Completed),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&db)
            .await?;
        }
        assert_eq!(next_order_id(&db).await?, "ORD-042");
        Ok(())
    }

    #[tokio::test]
    async fn test_order_lifecycle() -> Result<()> {
        let db = seeded_test_db().await?;
        let cart = cart_with(&db, &[("Pure Sugarcane", DrinkSize::Regular, Special::None, 2)]).await?;
        let placed = place_order(&db, &cart, CustomerInfo::default()).await?;
        let id = placed.order.id;

        let result = advance_order(&db, &id).await;
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));

        assert_eq!(approve_order(&db, "ord-001").await?.status, OrderStatus::Approved);
        assert!(approve_order(&db, &id).await.is_err());
        assert_eq!(advance_order(&db, &id).await?.status, OrderStatus::Preparing);
        assert_eq!(advance_order(&db, &id).await?.status, OrderStatus::Ready);
        assert_eq!(advance_order(&db, &id).await?.status, OrderStatus::Completed);
        assert!(advance_order(&db, &id).await.is_err());

        let result = cancel_order(&db, &id).await;
        assert!(matches!(result, Err(Error::InvalidTransition { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_approve_deducts_stock() -> Result<()> {
        let db = seeded_test_db().await?;
        let cart = cart_with(
            &db,
            &[
                ("Yakult Cane", DrinkSize::Regular, Special::None, 20),
                ("Orange Cane", DrinkSize::Tall, Special::None, 3),
            ],
        )
        .await?;
        let first = place_order(&db, &cart, CustomerInfo::default()).await?;
        let second = place_order(&db, &cart, CustomerInfo::default()).await?;

        approve_order(&db, &first.order.id).await?;
        let stock = inventory::get_inventory(&db).await?;
        let yakult = stock.iter().find(|i| i.name == "Yakult Cane").unwrap();
        assert_eq!(yakult.stock, 8);

        let result = approve_order(&db, &second.order.id).await;
        assert!(matches!(result, Err(Error::InsufficientStock { .. })));
        let still_pending = get_order(&db, &second.order.id).await?.unwrap();
        assert_eq!(still_pending.order.status, OrderStatus::Pending);
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_removes_pending_order() -> Result<()> {
        let db = seeded_test_db().await?;
        let cart = cart_with(&db, &[("Lemon Cane", DrinkSize::Regular, Special::None, 1)]).await?;
        let placed = place_order(&db, &cart, CustomerInfo::default()).await?;

        cancel_order(&db, &placed.order.id).await?;
        assert!(get_order(&db, &placed.order.id).await?.is_none());
        assert!(get_order_items(&db, &placed.order.id).await?.is_empty());

        let result = cancel_order(&db, "ORD-404").await;
        assert!(matches!(result, Err(Error::OrderNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_orders_filters() -> Result<()> {
        let db = seeded_test_db().await?;
        let cart = cart_with(&db, &[("Lemon Cane", DrinkSize::Regular, Special::None, 1)]).await?;
        let customer = CustomerInfo {
            name: Some("Jess".to_string()),
            username: Some("customer1".to_string()),
            ..CustomerInfo::default()
        };
        let first = place_order(&db, &cart, customer).await?;
        place_order(&db, &cart, CustomerInfo::default()).await?;
        approve_order(&db, &first.order.id).await?;

        assert_eq!(list_orders(&db, None).await?.len(), 2);
        assert_eq!(list_orders(&db, Some(OrderStatus::Pending)).await?.len(), 1);
        let mine = list_orders_for_customer(&db, "customer1").await?;
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].customer_name, "Jess");
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_all_orders_resets_sales() -> Result<()> {
        let db = seeded_test_db().await?;
        let cart = cart_with(&db, &[("Lemon Cane", DrinkSize::Regular, Special::None, 1)]).await?;
        place_order(&db, &cart, CustomerInfo::default()).await?;
        place_order(&db, &cart, CustomerInfo::default()).await?;

        assert_eq!(clear_all_orders(&db).await?, 2);
        assert!(list_orders(&db, None).await?.is_empty());
        let summary = sales::get_sales_summary(&db).await?;
        assert!(summary.last_reset.is_some());
        assert_eq!(next_order_id(&db).await?, "ORD-001");
        Ok(())
    }

    #[tokio::test]
    async fn test_display_number_is_chronological() -> Result<()> {
        let db = seeded_test_db().await?;
        let cart = cart_with(&db, &[("Lemon Cane", DrinkSize::Regular, Special::None, 1)]).await?;
        place_order(&db, &cart, CustomerInfo::default()).await?;
        let second = place_order(&db, &cart, CustomerInfo::default()).await?;

        let orders = list_orders(&db, None).await?;
        assert_eq!(display_number(&orders, &second.order.id).as_deref(), Some("002"));
        assert_eq!(display_number(&orders, "ORD-999"), None);
        Ok(())
    }
}
