use std::fmt;

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Statuses outside the known set are preserved verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Preparing,
    Ready,
    Completed,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pending" => Self::Pending,
            "paid" => Self::Paid,
            "preparing" => Self::Preparing,
            "ready" => Self::Ready,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line item inside an order.
///
/// Accepts the backend's snake_case keys as well as the dashboard form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    #[serde(alias = "product_id")]
    pub product_id: i64,
    #[serde(alias = "product_name")]
    pub product_name: String,
    #[serde(alias = "product_image")]
    pub product_image: String,
    #[serde(deserialize_with = "crate::amount::deserialize")]
    pub price: f64,
    pub quantity: u32,
    #[serde(deserialize_with = "crate::amount::deserialize")]
    pub subtotal: f64,
}

/// Dashboard-side order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub order_no: String,
    pub user_id: i64,
    pub user_name: String,
    pub user_phone: String,
    pub user_address: String,
    pub items: Vec<OrderItem>,
    #[serde(deserialize_with = "crate::amount::deserialize")]
    pub total_amount: f64,
    pub status: OrderStatus,
    pub delivery_type: String,
    pub payment_method: String,
    pub remark: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Order list filters as the dashboard expresses them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    pub page: u32,
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl OrderQuery {
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            ..Default::default()
        }
    }
}
