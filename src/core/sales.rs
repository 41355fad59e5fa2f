//! Sales figures, computed from the orders table on every read.
//!
//! Only the time of the last reset is stored. Orders placed before it no
//! longer count toward the summary, and clearing all orders records a reset.

use crate::{
    core::settings::{read_state, write_state},
    entities::{Order, OrderStatus, order},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{QueryOrder, prelude::*};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

const SALES_RESET_KEY: &str = "sales_last_reset";

/// Longest period [`daily_sales`] reports on.
pub const MAX_SALES_DAYS: u32 = 366;

/// Totals since the last reset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesSummary {
    /// Sum of totals of approved (and later) orders
    pub total_sales: f64,
    pub total_orders: usize,
    pub pending_orders: usize,
    /// Orders past approval, whatever their current stage
    pub approved_orders: usize,
    pub last_reset: Option<DateTime<Utc>>,
}

/// Revenue for one UTC day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub orders: usize,
    pub revenue: f64,
}

/// Stores `at` as the sales reset marker.
pub(crate) async fn record_reset<C>(db: &C, at: DateTime<Utc>) -> Result<()>
where
    C: ConnectionTrait,
{
    write_state(db, SALES_RESET_KEY, at.to_rfc3339()).await
}

async fn last_reset<C>(db: &C) -> Result<Option<DateTime<Utc>>>
where
    C: ConnectionTrait,
{
    let Some(raw) = read_state(db, SALES_RESET_KEY).await? else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(&raw)
        .map(|at| Some(at.with_timezone(&Utc)))
        .map_err(|e| Error::Config {
            message: format!("Failed to parse sales reset time: {e}"),
        })
}

async fn orders_since(
    db: &DatabaseConnection,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<order::Model>> {
    let mut query = Order::find();
    if let Some(since) = since {
        query = query.filter(order::Column::CreatedAt.gte(since));
    }
    query
        .order_by_asc(order::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sales totals since the last reset.
pub async fn get_sales_summary(db: &DatabaseConnection) -> Result<SalesSummary> {
    let last_reset = last_reset(db).await?;
    let orders = orders_since(db, last_reset).await?;

    let pending_orders = orders
        .iter()
        .filter(|order| order.status == OrderStatus::Pending)
        .count();
    let total_sales = orders
        .iter()
        .filter(|order| order.status.is_sale())
        .map(|order| order.total)
        .sum::<f64>();

    Ok(SalesSummary {
        total_sales: (total_sales * 100.0).round() / 100.0,
        total_orders: orders.len(),
        pending_orders,
        approved_orders: orders.len() - pending_orders,
        last_reset,
    })
}

/// Starts a new sales period now. Orders are kept.
pub async fn reset_sales(db: &DatabaseConnection) -> Result<DateTime<Utc>> {
    let now = Utc::now();
    record_reset(db, now).await?;
    info!("Sales reset at {}", now.to_rfc3339());
    Ok(now)
}

/// Revenue and order count per UTC day for the last `days` days, oldest
/// first. Days without sales are included with zeros.
///
/// # Errors
/// Returns a validation error when `days` exceeds [`MAX_SALES_DAYS`].
pub async fn daily_sales(db: &DatabaseConnection, days: u32) -> Result<Vec<DailySales>> {
    if days == 0 {
        return Ok(Vec::new());
    }
    if days > MAX_SALES_DAYS {
        return Err(Error::validation(format!(
            "Sales can be charted for at most {MAX_SALES_DAYS} days, got {days}"
        )));
    }
    let today = Utc::now().date_naive();
    let first_day = today - Duration::days(i64::from(days - 1));

    let mut by_day: BTreeMap<NaiveDate, DailySales> = (0..i64::from(days))
        .map(|offset| {
            let date = first_day + Duration::days(offset);
            (
                date,
                DailySales {
                    date,
                    orders: 0,
                    revenue: 0.0,
                },
            )
        })
        .collect();

    let start = first_day.and_hms_opt(0, 0, 0).map(|start| start.and_utc());
    for order in orders_since(db, start).await? {
        if !order.status.is_sale() {
            continue;
        }
        if let Some(day) = by_day.get_mut(&order.created_at.date_naive()) {
            day.orders += 1;
            day.revenue += order.total;
        }
    }

    Ok(by_day
        .into_values()
        .map(|mut day| {
            day.revenue = (day.revenue * 100.0).round() / 100.0;
            day
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::order::{CustomerInfo, approve_order, place_order};
    use crate::entities::{DrinkSize, Special};
    use crate::test_utils::{cart_with, seeded_test_db};

    #[tokio::test]
    async fn test_summary_counts_only_approved_sales() -> Result<()> {
        let db = seeded_test_db().await?;
        let cart = cart_with(&db, &[("Lemon Cane", DrinkSize::Regular, Special::None, 2)]).await?;
        let first = place_order(&db, &cart, CustomerInfo::default()).await?;
        place_order(&db, &cart, CustomerInfo::default()).await?;
        approve_order(&db, &first.order.id).await?;

        let summary = get_sales_summary(&db).await?;
        assert_eq!(summary.total_orders, 2);
        assert_eq!(summary.pending_orders, 1);
        assert_eq!(summary.approved_orders, 1);
        assert_eq!(summary.total_sales, 193.13);
        assert!(summary.last_reset.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_starts_new_period() -> Result<()> {
        let db = seeded_test_db().await?;
        let cart = cart_with(&db, &[("Lemon Cane", DrinkSize::Regular, Special::None, 2)]).await?;
        let placed = place_order(&db, &cart, CustomerInfo::default()).await?;
        approve_order(&db, &placed.order.id).await?;

        let reset_at = reset_sales(&db).await?;
        let summary = get_sales_summary(&db).await?;
        assert_eq!(summary.total_orders, 0);
        assert_eq!(summary.total_sales, 0.0);
        assert_eq!(summary.last_reset, Some(reset_at));
        Ok(())
    }

    #[tokio::test]
    async fn test_daily_sales_includes_empty_days() -> Result<()> {
        let db = seeded_test_db().await?;
        let cart = cart_with(&db, &[("Lemon Cane", DrinkSize::Regular, Special::None, 2)]).await?;
        let placed = place_order(&db, &cart, CustomerInfo::default()).await?;
        place_order(&db, &cart, CustomerInfo::default()).await?;
        approve_order(&db, &placed.order.id).await?;

        let days = daily_sales(&db, 7).await?;
        assert_eq!(days.len(), 7);
        assert_eq!(days[6].date, Utc::now().date_naive());
        assert_eq!(days[6].orders, 1);
        assert_eq!(days[6].revenue, 193.13);
        assert!(days[..6].iter().all(|day| day.orders == 0));

        assert!(daily_sales(&db, 0).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_daily_sales_rejects_long_periods() -> Result<()> {
        let db = seeded_test_db().await?;

        assert_eq!(daily_sales(&db, MAX_SALES_DAYS).await?.len(), 366);
        let result = daily_sales(&db, MAX_SALES_DAYS + 1).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        let result = daily_sales(&db, u32::MAX).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }
}
