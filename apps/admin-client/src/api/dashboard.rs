//! Statistics for the dashboard home screen.

use delivery_common::{DashboardStats, ProductQuery, TodayStats, TopProduct, TrendPoint};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::gateway::Gateway;

use super::products::list_products;

pub const DEFAULT_TREND_DAYS: u32 = 7;
pub const DEFAULT_TOP_LIMIT: u32 = 10;

/// Totals over a trend window.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendSummary {
    pub total_orders: u64,
    #[serde(deserialize_with = "delivery_common::amount::deserialize")]
    pub total_sales: f64,
    pub total_users: u64,
    #[serde(deserialize_with = "delivery_common::amount::deserialize")]
    pub avg_daily_orders: f64,
    #[serde(deserialize_with = "delivery_common::amount::deserialize")]
    pub avg_daily_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderTrend {
    pub trend: Vec<TrendPoint>,
    pub summary: TrendSummary,
}

#[derive(Debug, Serialize)]
struct Days {
    days: u32,
}

#[derive(Debug, Serialize)]
struct Limit {
    limit: u32,
}

/// Today's headline figures.
pub async fn dashboard_stats(gateway: &Gateway) -> Result<TodayStats, ClientError> {
    gateway.get("/admin/analytics/today").await
}

pub async fn order_trend(gateway: &Gateway, days: u32) -> Result<OrderTrend, ClientError> {
    gateway
        .get_with("/admin/analytics/trend", &Days { days })
        .await
}

pub async fn top_products(gateway: &Gateway, limit: u32) -> Result<Vec<TopProduct>, ClientError> {
    gateway
        .get_with("/admin/analytics/hot-products", &Limit { limit })
        .await
}

/// Everything the statistics screen renders, fetched concurrently.
///
/// Fails as soon as any of the underlying calls fails.
pub async fn overview(gateway: &Gateway) -> Result<DashboardStats, ClientError> {
    let catalog = ProductQuery {
        page: 1,
        page_size: 1,
        ..Default::default()
    };
    let (today, trend, top, products) = tokio::try_join!(
        dashboard_stats(gateway),
        order_trend(gateway, DEFAULT_TREND_DAYS),
        top_products(gateway, DEFAULT_TOP_LIMIT),
        list_products(gateway, &catalog),
    )?;

    Ok(DashboardStats {
        today_orders: today.order_count,
        today_sales: today.total_sales,
        total_users: trend.summary.total_users,
        total_products: products.total,
        order_trend: trend.trend,
        top_products: top,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trend_response_decodes() {
        let trend: OrderTrend = serde_json::from_value(json!({
            "trend": [
                {"date": "2024-01-01", "orders": 3, "sales": "90.50", "users": 1},
                {"date": "2024-01-02", "orders": 1, "sales": 12, "users": 0}
            ],
            "summary": {
                "total_orders": 4, "total_sales": 102.5, "total_users": 1,
                "avg_daily_orders": 2.0, "avg_daily_sales": 51.25
            }
        }))
        .unwrap();
        assert_eq!(trend.trend.len(), 2);
        assert_eq!(trend.trend[0].sales, 90.5);
        assert_eq!(trend.summary.total_orders, 4);
    }
}
