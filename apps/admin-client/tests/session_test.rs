mod common;

use serde_json::json;

use admin_client::api::auth;
use admin_client::error::ClientError;
use admin_client::storage::{KeyValueStore, TOKEN_KEY, USER_KEY};

fn tokens() -> serde_json::Value {
    json!({"access_token": "tok-1", "refresh_token": "ref-1", "token_type": "bearer"})
}

fn profile() -> serde_json::Value {
    json!({
        "id": 1,
        "username": "admin",
        "email": "admin@example.com",
        "role": "admin",
        "is_active": true,
        "created_at": "2024-01-01T00:00:00"
    })
}

#[tokio::test]
async fn login_stores_tokens_and_profile() {
    let backend = common::StubBackend::start().await;
    backend.on_json("POST", "/admin/auth/login", 200, tokens());
    backend.on_json("GET", "/admin/auth/me", 200, profile());
    let c = common::client(&backend.config());

    let resp = auth::login(&c.gateway, "admin", "admin123").await.unwrap();

    assert_eq!(resp.access_token, "tok-1");
    assert!(c.session.is_logged_in());
    assert_eq!(c.session.token().as_deref(), Some("tok-1"));
    assert_eq!(c.session.user().unwrap().username, "admin");
    assert_eq!(c.storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
    assert!(c.storage.get(USER_KEY).unwrap().is_some());

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].body,
        Some(json!({"username": "admin", "password": "admin123"}))
    );
    assert_eq!(requests[1].authorization.as_deref(), Some("Bearer tok-1"));
    assert!(c.notifier.notifications().is_empty());
}

#[tokio::test]
async fn failed_profile_fetch_still_logs_in() {
    let backend = common::StubBackend::start().await;
    backend.on_json("POST", "/admin/auth/login", 200, tokens());
    backend.on_json("GET", "/admin/auth/me", 500, json!({"detail": "boom"}));
    let c = common::client(&backend.config());

    let resp = auth::login(&c.gateway, "admin", "admin123").await;

    assert!(resp.is_ok());
    assert!(c.session.is_logged_in());
    assert!(c.session.user().is_none());
    assert_eq!(c.notifier.messages(), vec!["服务器错误".to_string()]);
}

#[tokio::test]
async fn rejected_login_surfaces_server_detail() {
    let backend = common::StubBackend::start().await;
    backend.on_json(
        "POST",
        "/admin/auth/login",
        401,
        json!({"detail": "用户名或密码错误"}),
    );
    let c = common::client(&backend.config());

    let err = auth::login(&c.gateway, "admin", "wrong").await.unwrap_err();

    assert_eq!(err, ClientError::Auth("用户名或密码错误".into()));
    assert_eq!(err.to_string(), "用户名或密码错误");
    assert!(!c.session.is_logged_in());
    assert!(c.storage.is_empty());
    assert_eq!(c.notifier.messages(), vec!["未授权，请登录".to_string()]);
    assert_eq!(c.notifier.navigations(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn logout_is_idempotent() {
    let backend = common::StubBackend::start().await;
    let c = common::logged_in_client(&backend.config(), "tok-1");
    assert!(c.session.is_logged_in());

    c.session.logout();
    c.session.logout();

    assert!(!c.session.is_logged_in());
    assert!(c.storage.is_empty());
}

#[tokio::test]
async fn profile_without_session_sends_no_token() {
    let backend = common::StubBackend::start().await;
    backend.on_json(
        "GET",
        "/admin/auth/me",
        401,
        json!({"detail": "Not authenticated"}),
    );
    let c = common::client(&backend.config());

    let err = auth::get_profile(&c.gateway).await.unwrap_err();

    assert_eq!(err, ClientError::Auth("Not authenticated".into()));
    assert!(backend.last_request().authorization.is_none());
}

#[tokio::test]
async fn remote_logout_clears_session_even_on_failure() {
    let backend = common::StubBackend::start().await;
    backend.on_json("POST", "/admin/auth/logout", 500, json!({}));
    let c = common::logged_in_client(&backend.config(), "tok-1");

    let err = auth::logout_remote(&c.gateway).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(!c.session.is_logged_in());
    assert!(c.storage.is_empty());
}

#[tokio::test]
async fn refresh_trades_the_stored_refresh_token() {
    let backend = common::StubBackend::start().await;
    backend.on_json(
        "POST",
        "/admin/auth/refresh",
        200,
        json!({"access_token": "tok-2", "refresh_token": "ref-2"}),
    );
    let c = common::logged_in_client(&backend.config(), "tok-1");

    let tokens = auth::refresh(&c.gateway).await.unwrap();

    assert_eq!(tokens.access_token, "tok-2");
    assert_eq!(c.session.token().as_deref(), Some("tok-2"));
    let req = backend.last_request();
    assert_eq!(req.query.get("refresh_token").map(String::as_str), Some("refresh-1"));
    assert_eq!(req.authorization.as_deref(), Some("Bearer tok-1"));
}

#[tokio::test]
async fn refresh_without_session_fails_locally() {
    let backend = common::StubBackend::start().await;
    let c = common::client(&backend.config());

    let err = auth::refresh(&c.gateway).await.unwrap_err();

    assert_eq!(err, ClientError::Auth("未登录".into()));
    assert!(backend.requests().is_empty());
    assert_eq!(c.notifier.messages(), vec!["未登录".to_string()]);
}
