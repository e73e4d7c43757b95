mod common;

use chrono::NaiveDate;
use serde_json::Value;

use admin_client::api::{auth, dashboard, orders, products};
use admin_client::config::Config;
use admin_client::error::ClientError;
use admin_client::mock::fixtures::SEED;
use admin_client::mock::{Fixtures, MockBackend, MOCK_PASSWORD, MOCK_USERNAME, NOT_IMPLEMENTED};
use delivery_common::order::{OrderQuery, OrderStatus};
use delivery_common::product::{ProductForm, ProductQuery, ProductStatus};

fn mock_client() -> common::TestClient {
    let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let mut c = common::client(&Config::default());
    c.gateway = c
        .gateway
        .clone()
        .with_mock(MockBackend::from_fixtures(Fixtures::seeded(SEED, today)));
    c
}

#[tokio::test]
async fn mock_login_round_trip() {
    let c = mock_client();

    let err = auth::login(&c.gateway, MOCK_USERNAME, "wrong").await.unwrap_err();
    assert_eq!(err, ClientError::Auth("用户名或密码错误".into()));
    assert!(!c.session.is_logged_in());

    auth::login(&c.gateway, MOCK_USERNAME, MOCK_PASSWORD)
        .await
        .unwrap();
    assert!(c.session.is_logged_in());
    assert_eq!(c.session.user().unwrap().username, "admin");
}

#[tokio::test]
async fn mock_orders_paginate_newest_first() {
    let c = mock_client();

    let page = orders::list_orders(&c.gateway, &OrderQuery::page(1, 10))
        .await
        .unwrap();

    assert_eq!(page.total, 50);
    assert_eq!(page.list.len(), 10);
    assert!(page
        .list
        .windows(2)
        .all(|w| w[0].created_at >= w[1].created_at));

    let id = page.list[0].id;
    orders::update_order_status(&c.gateway, id, &OrderStatus::Cancelled)
        .await
        .unwrap();
    let order = orders::get_order(&c.gateway, id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn mock_products_follow_categories() {
    let c = mock_client();
    let form = ProductForm {
        name: "降噪耳机".into(),
        price: Some(59.0),
        stock: Some(10),
        category: "耳机".into(),
        status: Some(ProductStatus::Active),
        ..Default::default()
    };

    let err = products::create_product(
        &c.gateway,
        &ProductForm {
            category: "不存在".into(),
            ..form.clone()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err, ClientError::RequestFailed("分类不存在".into()));

    products::create_product(&c.gateway, &form).await.unwrap();
    let query = ProductQuery {
        page: 1,
        page_size: 20,
        ..Default::default()
    };
    let page = products::list_products(&c.gateway, &query).await.unwrap();
    assert_eq!(page.total, 6);
    assert!(page.list.iter().any(|p| p.name == "降噪耳机" && p.category == "耳机"));
}

#[tokio::test]
async fn mock_overview_composes_stats() {
    let c = mock_client();

    let stats = dashboard::overview(&c.gateway).await.unwrap();

    assert_eq!(stats.total_products, 5);
    assert_eq!(stats.order_trend.len(), dashboard::DEFAULT_TREND_DAYS as usize);
    assert!(!stats.top_products.is_empty());
}

#[tokio::test]
async fn unknown_mock_route_is_rejected() {
    let c = mock_client();

    let err = c.gateway.get::<Value>("/admin/coupons").await.unwrap_err();

    assert_eq!(err, ClientError::RequestFailed(NOT_IMPLEMENTED.into()));
    assert_eq!(c.notifier.messages(), vec![NOT_IMPLEMENTED.to_string()]);
}
