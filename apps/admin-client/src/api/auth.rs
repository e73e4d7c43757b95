//! Login, profile and token lifecycle.

use delivery_common::{LoginResponse, UserProfile};
use serde::Serialize;

use crate::error::ClientError;
use crate::gateway::{ApiRequest, Gateway};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshQuery<'a> {
    refresh_token: &'a str,
}

/// Log in and populate the session.
///
/// On success both tokens are stored and the profile is fetched best-effort;
/// a failed profile fetch is logged and does not fail the login. The raw
/// token payload is returned. On failure the error is returned unchanged and
/// the session is left logged out.
pub async fn login(
    gateway: &Gateway,
    username: &str,
    password: &str,
) -> Result<LoginResponse, ClientError> {
    let tokens: LoginResponse = gateway
        .post("/admin/auth/login", &LoginRequest { username, password })
        .await?;

    gateway.session().store_tokens(&tokens);
    tracing::info!(%username, "logged in");

    if let Err(e) = get_profile(gateway).await {
        tracing::warn!(?e, "logged in, but the profile could not be fetched");
    }

    Ok(tokens)
}

/// Re-fetch the profile and replace the cached copy.
pub async fn get_profile(gateway: &Gateway) -> Result<UserProfile, ClientError> {
    let profile: UserProfile = gateway.get("/admin/auth/me").await?;
    gateway.session().store_profile(profile.clone());
    Ok(profile)
}

/// Tell the backend the session is over, then clear it locally no matter
/// what the backend said.
pub async fn logout_remote(gateway: &Gateway) -> Result<(), ClientError> {
    let result = gateway
        .send::<serde_json::Value>(ApiRequest::post("/admin/auth/logout"))
        .await;
    gateway.session().logout();
    result.map(|_| ())
}

/// Trade the stored refresh token for a new token pair.
pub async fn refresh(gateway: &Gateway) -> Result<LoginResponse, ClientError> {
    let refresh_token = gateway
        .session()
        .refresh_token()
        .ok_or_else(|| gateway.reject(ClientError::Auth("未登录".to_string())))?;

    let tokens: LoginResponse = gateway
        .send(ApiRequest::post("/admin/auth/refresh").query(&RefreshQuery {
            refresh_token: &refresh_token,
        }))
        .await?;

    gateway.session().store_tokens(&tokens);
    tracing::debug!("access token refreshed");
    Ok(tokens)
}
