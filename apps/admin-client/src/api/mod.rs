//! Typed wrappers over the admin REST endpoints.
//!
//! Each function translates dashboard field names (camelCase) to backend
//! field names (snake_case) on the way out and backend payloads to dashboard
//! types on the way back.

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ClientError;
use crate::gateway::{ApiRequest, Gateway};

/// Acknowledgement for a mutation. The backend usually answers
/// `{"message": "..."}`; anything else is accepted and ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ack {
    pub message: Option<String>,
}

impl From<Value> for Ack {
    fn from(value: Value) -> Self {
        Self {
            message: value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

pub(crate) async fn ack(gateway: &Gateway, req: ApiRequest) -> Result<Ack, ClientError> {
    gateway.send::<Value>(req).await.map(Ack::from)
}

/// The `pagination` block backend list endpoints attach.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Pagination {
    pub total: u64,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Treat empty strings the way the dashboard does: as "no filter".
pub(crate) fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.trim().is_empty()).cloned()
}
