use chrono::{Duration, Utc};
use delivery_common::{Order, OrderItem, OrderQuery, OrderStatus, Page};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;
use crate::gateway::{ApiRequest, Gateway};

use super::{ack, non_empty, Ack, Pagination};

/// Backend query for `GET /admin/orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderListParams {
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl From<&OrderQuery> for OrderListParams {
    fn from(q: &OrderQuery) -> Self {
        Self {
            page: q.page,
            page_size: q.page_size,
            status: q
                .status
                .as_ref()
                .map(|s| s.as_str().to_string())
                .filter(|s| !s.is_empty()),
            order_no: non_empty(&q.order_no),
            user_name: non_empty(&q.user_name),
            user_phone: non_empty(&q.user_phone),
            delivery_type: non_empty(&q.delivery_type),
            start_date: non_empty(&q.start_date),
            end_date: non_empty(&q.end_date),
        }
    }
}

/// Backend query for the CSV export.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct ExportParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<String>,
}

/// An order as the backend serializes it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BackendOrder {
    pub id: i64,
    pub order_number: Option<String>,
    pub user_id: Option<i64>,
    pub user_nickname: Option<String>,
    pub user_name: Option<String>,
    pub user_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub order_items: Option<Vec<OrderItem>>,
    #[serde(deserialize_with = "delivery_common::amount::deserialize")]
    pub total_amount: f64,
    pub status: Option<String>,
    pub delivery_type: Option<String>,
    pub payment_method: Option<String>,
    pub remark: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<BackendOrder> for Order {
    fn from(o: BackendOrder) -> Self {
        Self {
            id: o.id,
            order_no: o.order_number.unwrap_or_default(),
            user_id: o.user_id.unwrap_or(0),
            user_name: o
                .user_nickname
                .filter(|s| !s.is_empty())
                .or(o.user_name)
                .unwrap_or_default(),
            user_phone: o.user_phone.unwrap_or_default(),
            user_address: o.delivery_address.unwrap_or_default(),
            items: o.order_items.unwrap_or_default(),
            total_amount: o.total_amount,
            status: o
                .status
                .filter(|s| !s.is_empty())
                .map(OrderStatus::from)
                .unwrap_or_default(),
            delivery_type: o.delivery_type.unwrap_or_default(),
            payment_method: o
                .payment_method
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "wechat".to_string()),
            remark: o.remark.unwrap_or_default(),
            created_at: o.created_at.unwrap_or_default(),
            updated_at: o.updated_at.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OrderListResponse {
    orders: Vec<BackendOrder>,
    pagination: Option<Pagination>,
}

#[derive(Debug, Serialize)]
struct StatusUpdate<'a> {
    status: &'a str,
}

#[derive(Debug, Serialize)]
struct StatsRange {
    start_date: String,
    end_date: String,
}

pub async fn list_orders(gateway: &Gateway, query: &OrderQuery) -> Result<Page<Order>, ClientError> {
    let params = OrderListParams::from(query);
    tracing::debug!(?params, "listing orders");

    let resp: OrderListResponse = gateway.get_with("/admin/orders", &params).await?;
    let pagination = resp.pagination.unwrap_or_default();

    Ok(Page {
        list: resp.orders.into_iter().map(Order::from).collect(),
        total: pagination.total,
        page: pagination.page.unwrap_or(query.page),
        page_size: pagination.page_size.unwrap_or(query.page_size),
    })
}

pub async fn get_order(gateway: &Gateway, id: i64) -> Result<Order, ClientError> {
    let order: BackendOrder = gateway.get(&format!("/admin/orders/{id}")).await?;
    Ok(order.into())
}

pub async fn update_order_status(
    gateway: &Gateway,
    id: i64,
    status: &OrderStatus,
) -> Result<Ack, ClientError> {
    ack(
        gateway,
        ApiRequest::patch(format!("/admin/orders/{id}/status")).json(&StatusUpdate {
            status: status.as_str(),
        }),
    )
    .await
}

pub async fn delete_order(gateway: &Gateway, id: i64) -> Result<Ack, ClientError> {
    ack(gateway, ApiRequest::delete(format!("/orders/{id}"))).await
}

/// Download the filtered order list as CSV.
pub async fn export_orders(gateway: &Gateway, query: &OrderQuery) -> Result<Vec<u8>, ClientError> {
    let params = OrderListParams::from(query);
    let export = ExportParams {
        status: params.status,
        start_date: params.start_date,
        end_date: params.end_date,
    };
    gateway
        .download(ApiRequest::get("/admin/orders/export/csv").query(&export))
        .await
}

/// Order summary for the last `days` days, today included.
pub async fn order_stats(gateway: &Gateway, days: u32) -> Result<Value, ClientError> {
    let today = Utc::now().date_naive();
    let start = today - Duration::days(i64::from(days.max(1)) - 1);
    let range = StatsRange {
        start_date: start.format("%Y-%m-%d").to_string(),
        end_date: today.format("%Y-%m-%d").to_string(),
    };
    gateway.get_with("/admin/orders/stats/summary", &range).await
}
