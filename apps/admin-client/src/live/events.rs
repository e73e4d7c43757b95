//! Live-channel frames and the notifications they produce.

use delivery_common::Order;
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;
use crate::notify::{Level, Notification, MESSAGE_DURATION};

pub const NEW_ORDER: &str = "new_order";
pub const ORDER_UPDATED: &str = "order_updated";

/// A server push, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    NewOrder { order: Order },
    OrderUpdated { order: Order },
}

/// One decoded text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Event(LiveEvent),
    /// Well-formed, but of a type this client does not handle.
    Unknown(String),
}

impl Frame {
    /// Decode a text frame. Frames that are not JSON objects with a string
    /// `type`, or whose known type carries a bad payload, are malformed.
    pub fn decode(text: &str) -> Result<Self, ClientError> {
        let malformed = |e: serde_json::Error| ClientError::MalformedData(e.to_string());

        let value: Value = serde_json::from_str(text).map_err(malformed)?;
        match value.get("type").and_then(Value::as_str) {
            Some(NEW_ORDER) | Some(ORDER_UPDATED) => serde_json::from_value(value)
                .map(Frame::Event)
                .map_err(malformed),
            Some(other) => Ok(Frame::Unknown(other.to_string())),
            None => Err(malformed(serde_json::Error::custom("missing event type"))),
        }
    }
}

impl LiveEvent {
    pub fn order(&self) -> &Order {
        match self {
            Self::NewOrder { order } | Self::OrderUpdated { order } => order,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NewOrder { .. } => NEW_ORDER,
            Self::OrderUpdated { .. } => ORDER_UPDATED,
        }
    }

    /// What the operator sees for this event.
    ///
    /// A new order stays until dismissed and links to its detail page; a
    /// status change is transient.
    pub fn notification(&self) -> Notification {
        match self {
            Self::NewOrder { order } => Notification {
                level: Level::Success,
                title: Some("新订单".to_string()),
                message: format!(
                    "订单号: {}\n客户: {}\n金额: ¥{}",
                    order.order_no, order.user_name, order.total_amount
                ),
                duration: None,
                link: Some(format!("/orders/{}", order.id)),
            },
            Self::OrderUpdated { order } => Notification {
                level: Level::Info,
                title: Some("订单更新".to_string()),
                message: format!("订单 {} 状态已更新为 {}", order.order_no, order.status),
                duration: Some(MESSAGE_DURATION),
                link: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delivery_common::OrderStatus;

    #[test]
    fn new_order_notification() {
        let frame = Frame::decode(
            r#"{"type":"new_order","order":{"id":42,"orderNo":"A1","userName":"Li","totalAmount":36.5}}"#,
        )
        .unwrap();
        let Frame::Event(event) = frame else {
            panic!("expected an event");
        };
        let n = event.notification();
        assert_eq!(n.level, Level::Success);
        assert_eq!(n.title.as_deref(), Some("新订单"));
        assert_eq!(n.message, "订单号: A1\n客户: Li\n金额: ¥36.5");
        assert_eq!(n.duration, None);
        assert_eq!(n.link.as_deref(), Some("/orders/42"));
    }

    #[test]
    fn order_updated_notification() {
        let frame = Frame::decode(
            r#"{"type":"order_updated","order":{"id":7,"orderNo":"B2","status":"ready"}}"#,
        )
        .unwrap();
        let Frame::Event(event) = frame else {
            panic!("expected an event");
        };
        assert_eq!(event.order().status, OrderStatus::Ready);
        let n = event.notification();
        assert_eq!(n.level, Level::Info);
        assert_eq!(n.message, "订单 B2 状态已更新为 ready");
        assert_eq!(n.duration, Some(MESSAGE_DURATION));
    }

    #[test]
    fn unknown_type_is_not_an_error() {
        assert_eq!(
            Frame::decode(r#"{"type":"ping"}"#).unwrap(),
            Frame::Unknown("ping".into())
        );
    }

    #[test]
    fn malformed_frames() {
        for text in ["not json", r#"{"order":{}}"#, r#"[1,2]"#, r#"{"type":"new_order","order":5}"#] {
            assert!(
                matches!(Frame::decode(text), Err(ClientError::MalformedData(_))),
                "{text}"
            );
        }
    }
}
