use delivery_common::{Page, Review, ReviewQuery};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::gateway::{ApiRequest, Gateway};

use super::{ack, Ack, Pagination};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewListParams {
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
}

impl From<&ReviewQuery> for ReviewListParams {
    fn from(q: &ReviewQuery) -> Self {
        Self {
            page: q.page,
            page_size: q.page_size,
            product_id: q.product_id,
            rating: q.rating,
            is_visible: q.is_visible,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReviewListResponse {
    reviews: Vec<Review>,
    pagination: Option<Pagination>,
}

#[derive(Debug, Serialize)]
struct Reply<'a> {
    reply: &'a str,
}

#[derive(Debug, Serialize)]
struct Visibility {
    is_visible: bool,
}

pub async fn list_reviews(
    gateway: &Gateway,
    query: &ReviewQuery,
) -> Result<Page<Review>, ClientError> {
    let resp: ReviewListResponse = gateway
        .get_with("/admin/reviews", &ReviewListParams::from(query))
        .await?;
    let pagination = resp.pagination.unwrap_or_default();

    Ok(Page {
        list: resp.reviews,
        total: pagination.total,
        page: pagination.page.unwrap_or(query.page),
        page_size: pagination.page_size.unwrap_or(query.page_size),
    })
}

pub async fn delete_review(gateway: &Gateway, id: i64) -> Result<Ack, ClientError> {
    ack(gateway, ApiRequest::delete(format!("/admin/reviews/{id}"))).await
}

pub async fn reply_review(gateway: &Gateway, id: i64, reply: &str) -> Result<Ack, ClientError> {
    ack(
        gateway,
        ApiRequest::post(format!("/admin/reviews/{id}/reply")).json(&Reply { reply }),
    )
    .await
}

/// Show or hide a review. The flag travels as a query parameter.
pub async fn set_review_visibility(
    gateway: &Gateway,
    id: i64,
    visible: bool,
) -> Result<Ack, ClientError> {
    ack(
        gateway,
        ApiRequest::put(format!("/admin/reviews/{id}/visibility")).query(&Visibility {
            is_visible: visible,
        }),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn params_rename_and_omit_absent_filters() {
        let query = ReviewQuery {
            page: 1,
            page_size: 15,
            product_id: None,
            rating: Some(5),
            is_visible: Some(false),
        };
        let value = serde_json::to_value(ReviewListParams::from(&query)).unwrap();
        assert_eq!(
            value,
            json!({"page": 1, "page_size": 15, "rating": 5, "is_visible": false})
        );
    }

    #[test]
    fn list_response_tolerates_null_content() {
        let resp: ReviewListResponse = serde_json::from_value(json!({
            "reviews": [{
                "id": 1, "user_id": 2, "product_id": 3, "rating": 4,
                "content": null, "images": null, "is_visible": true,
                "created_at": "2024-01-01T00:00:00"
            }],
            "pagination": {"total": 1, "page": 1, "page_size": 20, "total_pages": 1}
        }))
        .unwrap();
        assert_eq!(resp.reviews.len(), 1);
        assert!(resp.reviews[0].content.is_none());
        assert_eq!(resp.pagination.unwrap().total, 1);
    }
}
