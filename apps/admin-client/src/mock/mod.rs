//! In-memory fixture backend.
//!
//! Answers the same routes as the real backend, in the real backend's shape,
//! so the typed API functions run unchanged against it.

pub mod fixtures;

use std::time::Duration;

use chrono::Utc;
use delivery_common::{Category, CategoryForm, OrderStatus, Product, ProductStatus};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ClientError;
use crate::gateway::ApiRequest;

pub use fixtures::Fixtures;
use fixtures::{day_of, order_json, SEED};

pub const NOT_IMPLEMENTED: &str = "Mock API not implemented";
pub const BAD_CREDENTIALS: &str = "用户名或密码错误";
pub const MOCK_USERNAME: &str = "admin";
pub const MOCK_PASSWORD: &str = "admin123";

const DEFAULT_PAGE_SIZE: u32 = 20;

pub struct MockBackend {
    db: Mutex<Fixtures>,
    latency: Duration,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Fixtures seeded for today, no latency.
    pub fn new() -> Self {
        Self::from_fixtures(Fixtures::seeded(SEED, Utc::now().date_naive()))
    }

    pub fn from_fixtures(fixtures: Fixtures) -> Self {
        Self {
            db: Mutex::new(fixtures),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Read the current fixture state.
    pub fn inspect<R>(&self, f: impl FnOnce(&Fixtures) -> R) -> R {
        f(&self.db.lock())
    }

    pub async fn respond(&self, req: &ApiRequest) -> Result<Value, ClientError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let result = route(&mut self.db.lock(), req);
        match &result {
            Ok(_) => tracing::debug!(method = %req.method, path = %req.path, "mock response"),
            Err(e) => tracing::debug!(method = %req.method, path = %req.path, %e, "mock rejection"),
        }
        result
    }
}

fn route(db: &mut Fixtures, req: &ApiRequest) -> Result<Value, ClientError> {
    let segments: Vec<&str> = req.path.split('/').filter(|s| !s.is_empty()).collect();

    match (req.method.as_str(), segments.as_slice()) {
        ("POST", ["admin", "auth", "login"]) => login(db, req),
        ("GET", ["admin", "auth", "me"]) => Ok(json!(db.admin)),
        ("POST", ["admin", "auth", "logout"]) => Ok(json!({"message": "登出成功"})),
        ("POST", ["admin", "auth", "refresh"]) => Ok(issue_tokens(db)),

        ("GET", ["admin", "orders"]) => list_orders(db, req),
        ("GET", ["admin", "orders", "export", "csv"]) => Ok(Value::String(export_orders(db))),
        ("GET", ["admin", "orders", "stats", "summary"]) => Ok(order_summary(db)),
        ("GET", ["admin", "orders", id]) => {
            let id = parse_id(id)?;
            db.orders
                .iter()
                .find(|o| o.id == id)
                .map(order_json)
                .ok_or_else(|| not_found("订单不存在"))
        }
        ("PATCH", ["admin", "orders", id, "status"]) => {
            let id = parse_id(id)?;
            let update: StatusBody = body(req)?;
            let now = db.now();
            let order = db
                .orders
                .iter_mut()
                .find(|o| o.id == id)
                .ok_or_else(|| not_found("订单不存在"))?;
            order.status = OrderStatus::from(update.status);
            order.updated_at = now;
            Ok(json!({"message": "订单状态更新成功"}))
        }
        ("DELETE", ["orders", id]) => {
            let id = parse_id(id)?;
            remove_by_id(&mut db.orders, |o| o.id, id, "订单不存在")?;
            Ok(json!({"message": "订单删除成功"}))
        }

        ("GET", ["admin", "products"]) => list_products(db, req),
        ("GET", ["products", id]) => {
            let id = parse_id(id)?;
            let product = db
                .products
                .iter()
                .find(|p| p.id == id)
                .ok_or_else(|| not_found("商品不存在"))?;
            Ok(db.product_json(product))
        }
        ("POST", ["admin", "products"]) => create_product(db, req),
        ("PUT", ["admin", "products", id]) => update_product(db, req, parse_id(id)?),
        ("DELETE", ["admin", "products", id]) => {
            let id = parse_id(id)?;
            remove_by_id(&mut db.products, |p| p.id, id, "商品不存在")?;
            Ok(json!({"message": "商品删除成功"}))
        }
        ("PATCH", ["admin", "products", id, "stock"]) => {
            let id = parse_id(id)?;
            let update: StockBody = body(req)?;
            let product = db
                .products
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| not_found("商品不存在"))?;
            product.stock = update.stock;
            Ok(json!({"message": "库存更新成功", "stock": update.stock}))
        }

        ("GET", ["categories"]) => Ok(json!(db.categories)),
        ("GET", ["categories", id]) => {
            let id = parse_id(id)?;
            db.category_by_id(id)
                .map(|c| json!(c))
                .ok_or_else(|| not_found("分类不存在"))
        }
        ("POST", ["categories"]) => {
            let form: CategoryForm = body(req)?;
            let category = Category {
                id: Fixtures::next_id(&db.categories, |c| c.id),
                name: form.name,
                code: form.code,
                description: form.description,
                sort_order: form.sort_order,
                is_active: form.is_active,
                created_at: db.now(),
            };
            let value = json!(category);
            db.categories.push(category);
            Ok(value)
        }
        ("PUT", ["categories", id]) => {
            let id = parse_id(id)?;
            let form: CategoryForm = body(req)?;
            let category = db
                .categories
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| not_found("分类不存在"))?;
            category.name = form.name;
            category.code = form.code;
            category.description = form.description;
            category.sort_order = form.sort_order;
            category.is_active = form.is_active;
            Ok(json!(category))
        }
        ("DELETE", ["categories", id]) => {
            let id = parse_id(id)?;
            remove_by_id(&mut db.categories, |c| c.id, id, "分类不存在")?;
            Ok(json!({"message": "分类删除成功"}))
        }

        ("GET", ["admin", "users"]) => {
            let keyword = filter(req, "keyword");
            let users: Vec<_> = db
                .customers
                .iter()
                .filter(|u| {
                    keyword.as_deref().map_or(true, |k| {
                        u.nickname.as_deref().is_some_and(|n| n.contains(k))
                            || u.phone.as_deref().is_some_and(|p| p.contains(k))
                    })
                })
                .cloned()
                .collect();
            let (users, pagination) = paginate(&users, req);
            Ok(json!({"users": users, "pagination": pagination}))
        }
        ("PUT", ["admin", "users", id, "status"]) => {
            let id = parse_id(id)?;
            let update: StatusBody = body(req)?;
            let now = db.now();
            let user = db
                .customers
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or_else(|| not_found("用户不存在"))?;
            user.is_active = update.status == "active";
            user.updated_at = Some(now);
            Ok(json!({"message": "用户状态更新成功"}))
        }
        ("DELETE", ["admin", "users", id]) => {
            let id = parse_id(id)?;
            remove_by_id(&mut db.customers, |u| u.id, id, "用户不存在")?;
            Ok(json!({"message": "用户删除成功"}))
        }

        ("GET", ["admin", "reviews"]) => {
            let rating: Option<u8> = filter(req, "rating").and_then(|r| r.parse().ok());
            let product_id: Option<i64> = filter(req, "product_id").and_then(|p| p.parse().ok());
            let visible: Option<bool> = filter(req, "is_visible").and_then(|v| v.parse().ok());
            let reviews: Vec<_> = db
                .reviews
                .iter()
                .filter(|r| rating.map_or(true, |x| r.rating == x))
                .filter(|r| product_id.map_or(true, |x| r.product_id == x))
                .filter(|r| visible.map_or(true, |x| r.is_visible == x))
                .cloned()
                .collect();
            let (reviews, pagination) = paginate(&reviews, req);
            Ok(json!({"reviews": reviews, "pagination": pagination}))
        }
        ("DELETE", ["admin", "reviews", id]) => {
            let id = parse_id(id)?;
            remove_by_id(&mut db.reviews, |r| r.id, id, "评价不存在")?;
            Ok(json!({"message": "评价删除成功"}))
        }
        ("POST", ["admin", "reviews", id, "reply"]) => {
            let id = parse_id(id)?;
            let reply: ReplyBody = body(req)?;
            let review = db
                .reviews
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| not_found("评价不存在"))?;
            review.admin_reply = Some(reply.reply);
            Ok(json!({"message": "回复成功"}))
        }
        ("PUT", ["admin", "reviews", id, "visibility"]) => {
            let id = parse_id(id)?;
            let visible = req
                .query_str("is_visible")
                .and_then(|v| v.parse::<bool>().ok())
                .ok_or_else(|| ClientError::RequestFailed("缺少参数 is_visible".to_string()))?;
            let review = db
                .reviews
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| not_found("评价不存在"))?;
            review.is_visible = visible;
            Ok(json!({"message": "评价显示状态已更新"}))
        }

        ("GET", ["admin", "analytics", "today"]) => Ok(today_stats(db)),
        ("GET", ["admin", "analytics", "trend"]) => {
            let days = filter(req, "days")
                .and_then(|d| d.parse::<i64>().ok())
                .unwrap_or(7)
                .clamp(1, 90);
            Ok(trend(db, days))
        }
        ("GET", ["admin", "analytics", "hot-products"]) => {
            let limit = filter(req, "limit")
                .and_then(|l| l.parse::<usize>().ok())
                .unwrap_or(10)
                .clamp(1, 50);
            Ok(hot_products(db, limit))
        }

        _ => Err(ClientError::RequestFailed(NOT_IMPLEMENTED.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: String,
}

#[derive(Debug, Deserialize)]
struct StockBody {
    stock: i64,
}

#[derive(Debug, Deserialize)]
struct ReplyBody {
    reply: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProductBody {
    title: Option<String>,
    description: Option<String>,
    price: Option<f64>,
    stock: Option<i64>,
    category_id: Option<i64>,
    image_url: Option<String>,
    is_active: Option<bool>,
}

fn body<T: DeserializeOwned>(req: &ApiRequest) -> Result<T, ClientError> {
    let value = req.body.clone().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| ClientError::RequestFailed(format!("请求参数错误: {e}")))
}

fn parse_id(raw: &str) -> Result<i64, ClientError> {
    raw.parse()
        .map_err(|_| ClientError::RequestFailed(format!("无效的ID: {raw}")))
}

fn not_found(message: &str) -> ClientError {
    ClientError::RequestFailed(message.to_string())
}

/// A non-empty query parameter.
fn filter(req: &ApiRequest, key: &str) -> Option<String> {
    req.query_str(key).filter(|v| !v.trim().is_empty())
}

fn remove_by_id<T>(
    items: &mut Vec<T>,
    id_of: impl Fn(&T) -> i64,
    id: i64,
    missing: &str,
) -> Result<T, ClientError> {
    let index = items
        .iter()
        .position(|item| id_of(item) == id)
        .ok_or_else(|| not_found(missing))?;
    Ok(items.remove(index))
}

/// Slice one page out of `items` and build the backend's pagination block.
fn paginate<T: Clone>(items: &[T], req: &ApiRequest) -> (Vec<T>, Value) {
    let page = filter(req, "page")
        .and_then(|p| p.parse::<u32>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1);
    let page_size = filter(req, "page_size")
        .and_then(|p| p.parse::<u32>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE);

    let total = items.len();
    let start = ((page - 1) as usize).saturating_mul(page_size as usize).min(total);
    let end = start.saturating_add(page_size as usize).min(total);
    let total_pages = total.div_ceil(page_size as usize);

    (
        items[start..end].to_vec(),
        json!({
            "total": total,
            "page": page,
            "page_size": page_size,
            "total_pages": total_pages,
        }),
    )
}

fn issue_tokens(db: &mut Fixtures) -> Value {
    db.issued_tokens += 1;
    let n = db.issued_tokens;
    json!({
        "access_token": format!("mock-token-{n}"),
        "refresh_token": format!("mock-refresh-{n}"),
        "token_type": "bearer",
    })
}

fn login(db: &mut Fixtures, req: &ApiRequest) -> Result<Value, ClientError> {
    let creds: Credentials =
        body(req).map_err(|_| ClientError::Auth(BAD_CREDENTIALS.to_string()))?;
    if creds.username == MOCK_USERNAME && creds.password == MOCK_PASSWORD {
        Ok(issue_tokens(db))
    } else {
        Err(ClientError::Auth(BAD_CREDENTIALS.to_string()))
    }
}

fn list_orders(db: &Fixtures, req: &ApiRequest) -> Result<Value, ClientError> {
    let status = filter(req, "status");
    let order_no = filter(req, "order_no");
    let user_name = filter(req, "user_name");
    let range = filter(req, "start_date").zip(filter(req, "end_date"));

    let mut orders: Vec<_> = db
        .orders
        .iter()
        .filter(|o| status.as_deref().map_or(true, |s| o.status.as_str() == s))
        .filter(|o| order_no.as_deref().map_or(true, |n| o.order_no.contains(n)))
        .filter(|o| user_name.as_deref().map_or(true, |n| o.user_name.contains(n)))
        .filter(|o| {
            range.as_ref().map_or(true, |(start, end)| {
                let day = day_of(&o.created_at);
                day >= start.as_str() && day <= end.as_str()
            })
        })
        .collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let rendered: Vec<Value> = orders.into_iter().map(order_json).collect();
    let (orders, pagination) = paginate(&rendered, req);
    Ok(json!({"orders": orders, "pagination": pagination}))
}

fn export_orders(db: &Fixtures) -> String {
    let mut csv = String::from("order_number,user_nickname,user_phone,total_amount,status,created_at\n");
    for o in &db.orders {
        csv.push_str(&format!(
            "{},{},{},{:.2},{},{}\n",
            o.order_no, o.user_name, o.user_phone, o.total_amount, o.status, o.created_at
        ));
    }
    csv
}

fn order_summary(db: &Fixtures) -> Value {
    let count = |status: OrderStatus| db.orders.iter().filter(|o| o.status == status).count();
    let total_sales: f64 = db
        .orders
        .iter()
        .filter(|o| o.status != OrderStatus::Cancelled)
        .map(|o| o.total_amount)
        .sum();
    json!({
        "total_orders": db.orders.len(),
        "total_sales": total_sales,
        "pending_orders": count(OrderStatus::Pending),
        "paid_orders": count(OrderStatus::Paid),
        "completed_orders": count(OrderStatus::Completed),
        "cancelled_orders": count(OrderStatus::Cancelled),
    })
}

fn list_products(db: &Fixtures, req: &ApiRequest) -> Result<Value, ClientError> {
    let category = filter(req, "category");
    let status = filter(req, "status");
    let keyword = filter(req, "keyword");

    let products: Vec<Value> = db
        .products
        .iter()
        .filter(|p| category.as_deref().map_or(true, |c| p.category == c))
        .filter(|p| {
            status.as_deref().map_or(true, |s| {
                (s == "active") == p.status.is_active()
            })
        })
        .filter(|p| keyword.as_deref().map_or(true, |k| p.name.contains(k)))
        .map(|p| db.product_json(p))
        .collect();

    let (products, pagination) = paginate(&products, req);
    Ok(json!({"products": products, "pagination": pagination}))
}

fn category_name(db: &Fixtures, id: i64) -> Result<String, ClientError> {
    db.category_by_id(id)
        .map(|c| c.name.clone())
        .ok_or_else(|| not_found("分类不存在"))
}

fn create_product(db: &mut Fixtures, req: &ApiRequest) -> Result<Value, ClientError> {
    let form: ProductBody = body(req)?;
    let title = form
        .title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ClientError::RequestFailed("商品名称不能为空".to_string()))?;
    let category = category_name(db, form.category_id.unwrap_or(0))?;
    let image = form.image_url.unwrap_or_default();
    let now = db.now();

    let product = Product {
        id: Fixtures::next_id(&db.products, |p| p.id),
        name: title,
        description: form.description.unwrap_or_default(),
        price: form.price.unwrap_or(0.0),
        stock: form.stock.unwrap_or(0),
        category,
        images: vec![image.clone()],
        image,
        status: ProductStatus::from_active(form.is_active.unwrap_or(true)),
        sales: 0,
        created_at: now.clone(),
        updated_at: now,
    };
    let value = db.product_json(&product);
    db.products.push(product);
    Ok(value)
}

fn update_product(db: &mut Fixtures, req: &ApiRequest, id: i64) -> Result<Value, ClientError> {
    let form: ProductBody = body(req)?;
    let category = form
        .category_id
        .map(|c| category_name(db, c))
        .transpose()?;
    let now = db.now();

    let product = db
        .products
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| not_found("商品不存在"))?;
    if let Some(title) = form.title {
        product.name = title;
    }
    if let Some(description) = form.description {
        product.description = description;
    }
    if let Some(price) = form.price {
        product.price = price;
    }
    if let Some(stock) = form.stock {
        product.stock = stock;
    }
    if let Some(category) = category {
        product.category = category;
    }
    if let Some(image) = form.image_url {
        product.images = vec![image.clone()];
        product.image = image;
    }
    if let Some(active) = form.is_active {
        product.status = ProductStatus::from_active(active);
    }
    product.updated_at = now;

    let product = product.clone();
    Ok(db.product_json(&product))
}

fn today_stats(db: &Fixtures) -> Value {
    let today = db.today.format("%Y-%m-%d").to_string();
    let orders: Vec<_> = db
        .orders
        .iter()
        .filter(|o| day_of(&o.created_at) == today)
        .collect();
    let total_sales: f64 = orders.iter().map(|o| o.total_amount).sum();
    let avg = if orders.is_empty() {
        0.0
    } else {
        total_sales / orders.len() as f64
    };
    let new_users = db
        .customers
        .iter()
        .filter(|u| day_of(&u.created_at) == today)
        .count();

    json!({
        "order_count": orders.len(),
        "total_sales": total_sales,
        "new_users": new_users,
        "avg_order_value": avg,
        "paid_orders": orders.iter().filter(|o| o.status == OrderStatus::Paid).count(),
        "completed_orders": orders.iter().filter(|o| o.status == OrderStatus::Completed).count(),
    })
}

fn trend(db: &Fixtures, days: i64) -> Value {
    let points: Vec<Value> = (0..days)
        .rev()
        .map(|back| {
            let date = (db.today - chrono::Duration::days(back))
                .format("%Y-%m-%d")
                .to_string();
            let day_orders: Vec<_> = db
                .orders
                .iter()
                .filter(|o| day_of(&o.created_at) == date)
                .collect();
            let users = db
                .customers
                .iter()
                .filter(|u| day_of(&u.created_at) == date)
                .count();
            json!({
                "date": date,
                "orders": day_orders.len(),
                "sales": day_orders.iter().map(|o| o.total_amount).sum::<f64>(),
                "users": users,
            })
        })
        .collect();

    let total = |key: &str| points.iter().filter_map(|p| p[key].as_f64()).sum::<f64>();
    let total_orders = total("orders");
    let total_sales = total("sales");
    json!({
        "summary": {
            "total_orders": total_orders as u64,
            "total_sales": total_sales,
            "total_users": total("users") as u64,
            "avg_daily_orders": total_orders / days as f64,
            "avg_daily_sales": total_sales / days as f64,
        },
        "trend": points,
    })
}

fn hot_products(db: &Fixtures, limit: usize) -> Value {
    let mut products: Vec<&Product> = db.products.iter().collect();
    products.sort_by(|a, b| b.sales.cmp(&a.sales));
    let hot: Vec<Value> = products
        .into_iter()
        .take(limit)
        .map(|p| {
            json!({
                "product_id": p.id,
                "product_name": p.name,
                "product_image": p.image,
                "total_sold": p.sales,
                "total_revenue": p.price * p.sales as f64,
            })
        })
        .collect();
    Value::Array(hot)
}
