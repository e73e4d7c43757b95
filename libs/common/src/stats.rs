use serde::{Deserialize, Serialize};

/// Today's headline figures (`/admin/analytics/today`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TodayStats {
    pub order_count: u64,
    #[serde(deserialize_with = "crate::amount::deserialize")]
    pub total_sales: f64,
    pub new_users: u64,
    #[serde(deserialize_with = "crate::amount::deserialize")]
    pub avg_order_value: f64,
    pub paid_orders: u64,
    pub completed_orders: u64,
}

/// One day of the order trend chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendPoint {
    pub date: String,
    pub orders: u64,
    #[serde(deserialize_with = "crate::amount::deserialize")]
    pub sales: f64,
    pub users: u64,
}

/// A best-selling product (`/admin/analytics/hot-products`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TopProduct {
    #[serde(alias = "product_id")]
    pub id: i64,
    #[serde(alias = "product_name")]
    pub name: String,
    #[serde(alias = "total_sold")]
    pub sales: u64,
    #[serde(alias = "total_revenue", deserialize_with = "crate::amount::deserialize")]
    pub revenue: f64,
}

/// Everything the statistics screen renders.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub today_orders: u64,
    pub today_sales: f64,
    pub total_users: u64,
    pub total_products: u64,
    pub order_trend: Vec<TrendPoint>,
    pub top_products: Vec<TopProduct>,
}
