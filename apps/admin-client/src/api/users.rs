use delivery_common::{Customer, Page, UserQuery};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::gateway::{ApiRequest, Gateway};

use super::{ack, non_empty, Ack, Pagination};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserListParams {
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

impl From<&UserQuery> for UserListParams {
    fn from(q: &UserQuery) -> Self {
        Self {
            page: q.page,
            page_size: q.page_size,
            keyword: non_empty(&q.keyword),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserListResponse {
    users: Vec<Customer>,
    pagination: Option<Pagination>,
}

#[derive(Debug, Serialize)]
struct StatusUpdate<'a> {
    status: &'a str,
}

pub async fn list_users(gateway: &Gateway, query: &UserQuery) -> Result<Page<Customer>, ClientError> {
    let resp: UserListResponse = gateway
        .get_with("/admin/users", &UserListParams::from(query))
        .await?;
    let pagination = resp.pagination.unwrap_or_default();

    Ok(Page {
        list: resp.users,
        total: pagination.total,
        page: pagination.page.unwrap_or(query.page),
        page_size: pagination.page_size.unwrap_or(query.page_size),
    })
}

/// Enable or disable a customer account (`"active"` / `"inactive"`).
pub async fn update_user_status(gateway: &Gateway, id: i64, status: &str) -> Result<Ack, ClientError> {
    ack(
        gateway,
        ApiRequest::put(format!("/admin/users/{id}/status")).json(&StatusUpdate { status }),
    )
    .await
}

pub async fn delete_user(gateway: &Gateway, id: i64) -> Result<Ack, ClientError> {
    ack(gateway, ApiRequest::delete(format!("/admin/users/{id}"))).await
}
