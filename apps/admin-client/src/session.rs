//! Session store: the signed-in administrator's tokens and cached profile.
//!
//! A `Session` is an explicit context object. The gateway reads the token on
//! every dispatch; only login, logout, refresh and restore write it.

use std::sync::Arc;

use delivery_common::{LoginResponse, UserProfile};
use parking_lot::RwLock;

use crate::storage::{KeyValueStore, REFRESH_TOKEN_KEY, TOKEN_KEY, USER_KEY};

/// Point-in-time copy of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub token: String,
    pub refresh_token: String,
    pub user: Option<UserProfile>,
}

impl SessionState {
    pub fn is_logged_in(&self) -> bool {
        !self.token.is_empty()
    }
}

pub struct Session {
    state: RwLock<SessionState>,
    storage: Arc<dyn KeyValueStore>,
}

impl Session {
    /// An empty session that has not consulted storage.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            storage,
        }
    }

    /// Build a session from whatever durable storage holds.
    pub fn restore(storage: Arc<dyn KeyValueStore>) -> Self {
        let session = Self::new(storage);
        session.reload();
        session
    }

    /// Re-read tokens and profile from durable storage.
    ///
    /// A stored profile that fails to parse is logged, removed from storage
    /// and left empty; the token is kept, so the session stays logged in with
    /// an unknown profile.
    pub fn reload(&self) {
        let token = self.read_key(TOKEN_KEY).unwrap_or_default();
        let refresh_token = self.read_key(REFRESH_TOKEN_KEY).unwrap_or_default();

        let user = match self.read_key(USER_KEY) {
            Some(raw) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::error!(?e, "failed to parse stored user profile, discarding it");
                    if let Err(e) = self.storage.remove(USER_KEY) {
                        tracing::warn!(?e, "could not remove corrupt profile from storage");
                    }
                    None
                }
            },
            None => None,
        };

        tracing::debug!(logged_in = !token.is_empty(), has_profile = user.is_some(), "session restored");

        *self.state.write() = SessionState {
            token,
            refresh_token,
            user,
        };
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(?e, %key, "session storage read failed");
                None
            }
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.read().is_logged_in()
    }

    /// Access token, if logged in.
    pub fn token(&self) -> Option<String> {
        let state = self.state.read();
        (!state.token.is_empty()).then(|| state.token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        let state = self.state.read();
        (!state.refresh_token.is_empty()).then(|| state.refresh_token.clone())
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.read().user.clone()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Record a freshly issued token pair in memory and durable storage.
    pub fn store_tokens(&self, tokens: &LoginResponse) {
        {
            let mut state = self.state.write();
            state.token = tokens.access_token.clone();
            state.refresh_token = tokens.refresh_token.clone();
        }
        for (key, value) in [
            (TOKEN_KEY, tokens.access_token.as_str()),
            (REFRESH_TOKEN_KEY, tokens.refresh_token.as_str()),
        ] {
            if let Err(e) = self.storage.set(key, value) {
                tracing::warn!(?e, %key, "could not persist token");
            }
        }
    }

    /// Replace the cached profile wholesale and persist it.
    pub fn store_profile(&self, profile: UserProfile) {
        match serde_json::to_string(&profile) {
            Ok(json) => {
                if let Err(e) = self.storage.set(USER_KEY, &json) {
                    tracing::warn!(?e, "could not persist user profile");
                }
            }
            Err(e) => tracing::warn!(?e, "could not serialize user profile"),
        }
        self.state.write().user = Some(profile);
    }

    /// Clear tokens, profile and all durable keys. Idempotent.
    pub fn logout(&self) {
        *self.state.write() = SessionState::default();
        for key in [TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(?e, %key, "could not clear session key");
            }
        }
        tracing::debug!("session cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn profile() -> UserProfile {
        UserProfile {
            id: 1,
            username: "admin".into(),
            email: Some("admin@example.com".into()),
            role: "admin".into(),
            avatar: None,
            created_at: None,
        }
    }

    #[test]
    fn empty_storage_restores_logged_out() {
        let session = Session::restore(Arc::new(MemoryStore::new()));
        assert!(!session.is_logged_in());
        assert!(session.token().is_none());
        assert!(session.user().is_none());
    }

    #[test]
    fn valid_storage_restores_token_and_profile() {
        let json = serde_json::to_string(&profile()).unwrap();
        let store = Arc::new(MemoryStore::with_entries([
            (TOKEN_KEY, "test-token"),
            (USER_KEY, json.as_str()),
        ]));
        let session = Session::restore(store);
        assert!(session.is_logged_in());
        assert_eq!(session.token().as_deref(), Some("test-token"));
        assert_eq!(session.user(), Some(profile()));
    }

    /// Collects formatted log output.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn corrupt_profile_keeps_token() {
        let store = Arc::new(MemoryStore::with_entries([
            (TOKEN_KEY, "test-token"),
            (USER_KEY, "invalid json"),
        ]));
        let log = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(log.clone())
            .finish();
        let session =
            tracing::subscriber::with_default(subscriber, || Session::restore(store.clone()));

        let errors = log.contents().lines().filter(|l| l.contains("ERROR")).count();
        assert_eq!(errors, 1);
        assert!(session.is_logged_in());
        assert_eq!(session.token().as_deref(), Some("test-token"));
        assert!(session.user().is_none());
        assert!(store.get(USER_KEY).unwrap().is_none());
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("test-token"));
    }

    #[test]
    fn store_tokens_then_logout_clears_everything() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new(store.clone());

        session.store_tokens(&LoginResponse {
            access_token: "a".into(),
            refresh_token: "r".into(),
            token_type: "bearer".into(),
        });
        session.store_profile(profile());
        assert!(session.is_logged_in());
        assert_eq!(store.len(), 3);

        session.logout();
        assert!(!session.is_logged_in());
        assert!(session.user().is_none());
        assert!(store.is_empty());

        // Second logout is a no-op.
        session.logout();
        assert_eq!(session.snapshot(), SessionState::default());
    }
}
