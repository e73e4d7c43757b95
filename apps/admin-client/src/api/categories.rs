use delivery_common::{Category, CategoryForm};

use crate::error::ClientError;
use crate::gateway::{ApiRequest, Gateway};

use super::{ack, Ack};

pub async fn list_categories(gateway: &Gateway) -> Result<Vec<Category>, ClientError> {
    gateway.get("/categories").await
}

pub async fn get_category(gateway: &Gateway, id: i64) -> Result<Category, ClientError> {
    gateway.get(&format!("/categories/{id}")).await
}

pub async fn create_category(gateway: &Gateway, form: &CategoryForm) -> Result<Ack, ClientError> {
    ack(gateway, ApiRequest::post("/categories").json(form)).await
}

pub async fn update_category(
    gateway: &Gateway,
    id: i64,
    form: &CategoryForm,
) -> Result<Ack, ClientError> {
    ack(gateway, ApiRequest::put(format!("/categories/{id}")).json(form)).await
}

pub async fn delete_category(gateway: &Gateway, id: i64) -> Result<Ack, ClientError> {
    ack(gateway, ApiRequest::delete(format!("/categories/{id}"))).await
}
