use serde::{Deserialize, Serialize};

/// The signed-in administrator's profile, as cached by the session.
///
/// Accepts both the backend's snake_case payload and the camelCase form the
/// client writes to durable storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, alias = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Token pair returned by the login and refresh endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// A customer account as listed in user management.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
    pub id: i64,
    pub phone: Option<String>,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// Filters for the user management list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub page: u32,
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_accepts_backend_payload() {
        let json = r#"{
            "id": 1,
            "username": "admin",
            "email": null,
            "role": "admin",
            "is_active": true,
            "created_at": "2024-01-01T00:00:00"
        }"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.id, 1);
        assert!(profile.is_admin());
        assert_eq!(profile.created_at.as_deref(), Some("2024-01-01T00:00:00"));
    }

    #[test]
    fn profile_survives_storage_round_trip() {
        let profile = UserProfile {
            id: 2,
            username: "ops".into(),
            email: Some("ops@example.com".into()),
            role: "user".into(),
            avatar: None,
            created_at: Some("2024-01-02T00:00:00Z".into()),
        };
        let stored = serde_json::to_string(&profile).unwrap();
        assert!(stored.contains("createdAt"));
        let back: UserProfile = serde_json::from_str(&stored).unwrap();
        assert_eq!(back, profile);
        assert!(!back.is_admin());
    }

    #[test]
    fn login_response_defaults_token_type() {
        let r: LoginResponse =
            serde_json::from_str(r#"{"access_token":"a","refresh_token":"r"}"#).unwrap();
        assert_eq!(r.token_type, "bearer");
    }
}
