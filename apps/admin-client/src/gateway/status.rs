//! User-facing messages for transport failures.

use serde_json::Value;

pub const NETWORK_FAILURE: &str = "网络连接失败，请检查网络";
pub const GENERIC_FAILURE: &str = "请求失败";
pub const SESSION_EXPIRED_NOTICE: &str = "登录已过期，请重新登录";
pub const SESSION_EXPIRED: &str = "登录已过期";
pub const UNAUTHORIZED: &str = "未授权，请登录";

/// Message shown for an HTTP error status.
pub fn status_message(status: u16) -> String {
    match status {
        400 => "请求参数错误".to_string(),
        401 => UNAUTHORIZED.to_string(),
        403 => "拒绝访问".to_string(),
        404 => "请求资源不存在".to_string(),
        500 => "服务器错误".to_string(),
        502 => "网关错误".to_string(),
        503 => "服务不可用".to_string(),
        504 => "网关超时".to_string(),
        other => format!("{GENERIC_FAILURE}: {other}"),
    }
}

/// Pull the server's own explanation out of an error body.
///
/// Understands `{"detail": "..."}`, FastAPI validation lists
/// (`{"detail": [{"msg": "..."}]}`), and `{"message": "..."}`.
pub fn server_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let detail = match value.get("detail") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(items)) => items
            .first()
            .and_then(|item| item.get("msg"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    };
    detail
        .or_else(|| value.get("message").and_then(Value::as_str).map(str::to_string))
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_have_distinct_messages() {
        let statuses = [400, 401, 403, 404, 500, 502, 503, 504];
        let messages: std::collections::HashSet<_> =
            statuses.iter().map(|s| status_message(*s)).collect();
        assert_eq!(messages.len(), statuses.len());
        assert_eq!(status_message(418), "请求失败: 418");
    }

    #[test]
    fn extracts_detail_variants() {
        assert_eq!(
            server_detail(r#"{"detail":"用户名或密码错误"}"#).as_deref(),
            Some("用户名或密码错误")
        );
        assert_eq!(
            server_detail(r#"{"detail":[{"loc":["query","page"],"msg":"field required"}]}"#)
                .as_deref(),
            Some("field required")
        );
        assert_eq!(server_detail(r#"{"message":"nope"}"#).as_deref(), Some("nope"));
        assert_eq!(server_detail("<html>bad gateway</html>"), None);
        assert_eq!(server_detail(r#"{"detail":""}"#), None);
    }
}
