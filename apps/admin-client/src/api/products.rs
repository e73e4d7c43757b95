use delivery_common::{Category, Page, Product, ProductForm, ProductQuery, ProductStatus};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::gateway::{ApiRequest, Gateway};

use super::{ack, non_empty, Ack, Pagination};

/// Image used when a product is saved without one.
pub const DEFAULT_IMAGE: &str = "/images/default.png";

const UNKNOWN_CATEGORY: &str = "分类不存在";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductListParams {
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

impl From<&ProductQuery> for ProductListParams {
    fn from(q: &ProductQuery) -> Self {
        Self {
            page: q.page,
            page_size: q.page_size,
            category: non_empty(&q.category),
            status: q.status,
            keyword: non_empty(&q.keyword),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct CategoryRef {
    name: String,
}

/// A product as the backend serializes it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BackendProduct {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(deserialize_with = "delivery_common::amount::deserialize")]
    pub price: f64,
    pub stock: i64,
    pub sales_count: i64,
    pub image_url: Option<String>,
    pub local_image_path: Option<String>,
    pub is_active: bool,
    category: Option<CategoryRef>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<BackendProduct> for Product {
    fn from(p: BackendProduct) -> Self {
        let image = p
            .image_url
            .filter(|s| !s.is_empty())
            .or(p.local_image_path)
            .unwrap_or_default();
        Self {
            id: p.id,
            name: p.title,
            description: p.description.unwrap_or_default(),
            price: p.price,
            stock: p.stock,
            category: p.category.map(|c| c.name).unwrap_or_default(),
            images: if image.is_empty() { Vec::new() } else { vec![image.clone()] },
            image,
            status: ProductStatus::from_active(p.is_active),
            sales: p.sales_count,
            created_at: p.created_at.unwrap_or_default(),
            updated_at: p.updated_at.unwrap_or_default(),
        }
    }
}

/// Product list endpoints answer either in dashboard form, in backend form,
/// or with a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProductList {
    Dashboard(Page<Product>),
    Backend {
        products: Vec<BackendProduct>,
        #[serde(default)]
        pagination: Option<Pagination>,
    },
    Bare(Vec<BackendProduct>),
}

/// Body of a product create request.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct CreatePayload<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stock: Option<i64>,
    category_id: i64,
    local_image_path: &'a str,
    image_url: &'a str,
    is_active: bool,
}

/// Body of a product update request. Empty form fields are left out so they
/// never overwrite stored values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
struct UpdatePayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    local_image_path: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_active: Option<bool>,
}

fn create_payload(form: &ProductForm, category_id: i64) -> CreatePayload<'_> {
    let image = if form.image.is_empty() {
        DEFAULT_IMAGE
    } else {
        form.image.as_str()
    };
    CreatePayload {
        title: &form.name,
        description: form.description.as_deref(),
        price: form.price,
        stock: form.stock,
        category_id,
        local_image_path: image,
        image_url: image,
        is_active: form.status == Some(ProductStatus::Active),
    }
}

fn update_payload(form: &ProductForm, category_id: Option<i64>) -> UpdatePayload<'_> {
    let image = (!form.image.is_empty()).then_some(form.image.as_str());
    UpdatePayload {
        title: (!form.name.is_empty()).then_some(form.name.as_str()),
        description: form.description.as_deref(),
        price: form.price,
        stock: form.stock,
        category_id,
        local_image_path: image,
        image_url: image,
        is_active: form.status.map(ProductStatus::is_active),
    }
}

#[derive(Debug, Serialize)]
struct StockUpdate {
    stock: i64,
}

pub async fn list_products(
    gateway: &Gateway,
    query: &ProductQuery,
) -> Result<Page<Product>, ClientError> {
    let params = ProductListParams::from(query);
    let list: ProductList = gateway.get_with("/admin/products", &params).await?;

    Ok(match list {
        ProductList::Dashboard(page) => page,
        ProductList::Backend {
            products,
            pagination,
        } => {
            let pagination = pagination.unwrap_or_default();
            Page {
                total: pagination.total,
                page: pagination.page.unwrap_or(query.page),
                page_size: pagination.page_size.unwrap_or(query.page_size),
                list: products.into_iter().map(Product::from).collect(),
            }
        }
        ProductList::Bare(products) => Page {
            total: products.len() as u64,
            page: query.page,
            page_size: query.page_size,
            list: products.into_iter().map(Product::from).collect(),
        },
    })
}

pub async fn get_product(gateway: &Gateway, id: i64) -> Result<Product, ClientError> {
    let product: BackendProduct = gateway.get(&format!("/products/{id}")).await?;
    Ok(product.into())
}

pub async fn product_categories(gateway: &Gateway) -> Result<Vec<Category>, ClientError> {
    gateway.get("/categories").await
}

/// Look up a category id by display name.
async fn resolve_category(gateway: &Gateway, name: &str) -> Result<i64, ClientError> {
    let categories = product_categories(gateway).await?;
    categories
        .into_iter()
        .find(|c| c.name == name)
        .map(|c| c.id)
        .ok_or_else(|| {
            tracing::debug!(category = %name, "unknown product category");
            gateway.reject(ClientError::RequestFailed(UNKNOWN_CATEGORY.to_string()))
        })
}

pub async fn create_product(gateway: &Gateway, form: &ProductForm) -> Result<Ack, ClientError> {
    let category_id = resolve_category(gateway, &form.category).await?;
    ack(
        gateway,
        ApiRequest::post("/admin/products").json(&create_payload(form, category_id)),
    )
    .await
}

pub async fn update_product(
    gateway: &Gateway,
    id: i64,
    form: &ProductForm,
) -> Result<Ack, ClientError> {
    let category_id = if form.category.is_empty() {
        None
    } else {
        Some(resolve_category(gateway, &form.category).await?)
    };
    ack(
        gateway,
        ApiRequest::put(format!("/admin/products/{id}")).json(&update_payload(form, category_id)),
    )
    .await
}

pub async fn delete_product(gateway: &Gateway, id: i64) -> Result<Ack, ClientError> {
    ack(gateway, ApiRequest::delete(format!("/admin/products/{id}"))).await
}

pub async fn update_stock(gateway: &Gateway, id: i64, stock: i64) -> Result<Ack, ClientError> {
    ack(
        gateway,
        ApiRequest::patch(format!("/admin/products/{id}/stock")).json(&StockUpdate { stock }),
    )
    .await
}
