use serde::{Deserialize, Serialize};

/// A customer review as listed in the moderation screen.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub user_phone: Option<String>,
    pub user_nickname: Option<String>,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub rating: u8,
    pub content: Option<String>,
    pub images: Option<Vec<String>>,
    pub admin_reply: Option<String>,
    pub is_visible: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuery {
    pub page: u32,
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
}
