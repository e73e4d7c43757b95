mod common;

use serde_json::json;

use admin_client::api::{orders, products};
use admin_client::error::ClientError;
use delivery_common::order::{OrderQuery, OrderStatus};
use delivery_common::product::{ProductForm, ProductStatus};

fn order_page() -> serde_json::Value {
    json!({
        "orders": [{
            "id": 12,
            "order_number": "ORD202401010012",
            "user_id": 3,
            "user_nickname": "王五",
            "user_phone": "13800138003",
            "delivery_address": "北京市朝阳区",
            "order_items": [{"product_id": 1, "product_name": "iPhone 15 Pro", "quantity": 1, "price": "7999.00"}],
            "total_amount": "7999.00",
            "status": "paid",
            "delivery_type": "delivery",
            "created_at": "2024-01-01T10:00:00"
        }],
        "pagination": {"total": 41, "page": 2, "page_size": 20, "total_pages": 3}
    })
}

#[tokio::test]
async fn list_orders_sends_backend_names() {
    let backend = common::StubBackend::start().await;
    backend.on_json("GET", "/admin/orders", 200, order_page());
    let c = common::logged_in_client(&backend.config(), "tok-1");

    orders::list_orders(&c.gateway, &OrderQuery::page(1, 10))
        .await
        .unwrap();
    assert_eq!(
        backend.last_request().query.get("page_size").map(String::as_str),
        Some("10")
    );

    let query = OrderQuery {
        status: Some(OrderStatus::Paid),
        order_no: Some(String::new()),
        user_name: Some("王五".into()),
        ..OrderQuery::page(2, 20)
    };
    let page = orders::list_orders(&c.gateway, &query).await.unwrap();

    let req = backend.last_request();
    assert_eq!(req.query.get("page").map(String::as_str), Some("2"));
    assert_eq!(req.query.get("page_size").map(String::as_str), Some("20"));
    assert_eq!(req.query.get("status").map(String::as_str), Some("paid"));
    assert!(!req.query.contains_key("order_no"));
    assert!(!req.query.contains_key("pageSize"));

    assert_eq!(page.total, 41);
    assert_eq!(page.page, 2);
    let order = &page.list[0];
    assert_eq!(order.order_no, "ORD202401010012");
    assert_eq!(order.user_name, "王五");
    assert_eq!(order.user_address, "北京市朝阳区");
    assert_eq!(order.total_amount, 7999.0);
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.payment_method, "wechat");
}

#[tokio::test]
async fn status_update_patches_the_order() {
    let backend = common::StubBackend::start().await;
    backend.on_json(
        "PATCH",
        "/admin/orders/12/status",
        200,
        json!({"message": "订单状态已更新"}),
    );
    let c = common::logged_in_client(&backend.config(), "tok-1");

    let ack = orders::update_order_status(&c.gateway, 12, &OrderStatus::Completed)
        .await
        .unwrap();

    assert_eq!(ack.message.as_deref(), Some("订单状态已更新"));
    assert_eq!(
        backend.last_request().body,
        Some(json!({"status": "completed"}))
    );
}

#[tokio::test]
async fn export_returns_raw_csv() {
    let backend = common::StubBackend::start().await;
    backend.on(
        "GET",
        "/admin/orders/export/csv",
        200,
        "order_number,total_amount\nORD1,10.00\n",
    );
    let c = common::logged_in_client(&backend.config(), "tok-1");
    let query = OrderQuery {
        status: Some(OrderStatus::Completed),
        user_name: Some("张三".into()),
        ..OrderQuery::page(1, 20)
    };

    let csv = orders::export_orders(&c.gateway, &query).await.unwrap();

    assert!(String::from_utf8(csv).unwrap().starts_with("order_number"));
    let req = backend.last_request();
    assert_eq!(req.query.get("status").map(String::as_str), Some("completed"));
    assert!(!req.query.contains_key("user_name"));
    assert!(!req.query.contains_key("page"));
}

fn product_form(category: &str) -> ProductForm {
    ProductForm {
        name: "蓝牙耳机".into(),
        price: Some(199.0),
        stock: Some(30),
        category: category.into(),
        status: Some(ProductStatus::Active),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_product_resolves_category_id() {
    let backend = common::StubBackend::start().await;
    backend.on_json(
        "GET",
        "/categories",
        200,
        json!([{"id": 4, "name": "音频", "code": "audio", "sort_order": 4, "is_active": true}]),
    );
    backend.on_json("POST", "/admin/products", 200, json!({"message": "商品已创建"}));
    let c = common::logged_in_client(&backend.config(), "tok-1");

    products::create_product(&c.gateway, &product_form("音频"))
        .await
        .unwrap();

    let body = backend.last_request().body.unwrap();
    assert_eq!(body["title"], "蓝牙耳机");
    assert_eq!(body["category_id"], 4);
    assert_eq!(body["image_url"], products::DEFAULT_IMAGE);
    assert_eq!(body["is_active"], true);
}

#[tokio::test]
async fn unknown_category_never_posts() {
    let backend = common::StubBackend::start().await;
    backend.on_json("GET", "/categories", 200, json!([]));
    let c = common::logged_in_client(&backend.config(), "tok-1");

    let err = products::create_product(&c.gateway, &product_form("不存在"))
        .await
        .unwrap_err();

    assert_eq!(err, ClientError::RequestFailed("分类不存在".into()));
    assert_eq!(c.notifier.messages(), vec!["分类不存在".to_string()]);
    assert!(backend.requests().iter().all(|r| r.method == "GET"));
}
