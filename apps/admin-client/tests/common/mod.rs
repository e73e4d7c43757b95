#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use parking_lot::Mutex;
use serde_json::Value;

use admin_client::config::Config;
use admin_client::gateway::Gateway;
use admin_client::notify::RecordingNotifier;
use admin_client::session::Session;
use admin_client::storage::MemoryStore;

/// One request as the stub backend saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct StubState {
    replies: Mutex<HashMap<(String, String), (u16, String)>>,
    requests: Mutex<Vec<Recorded>>,
}

/// A canned-response HTTP backend listening on a random local port.
pub struct StubBackend {
    pub addr: SocketAddr,
    state: Arc<StubState>,
}

impl StubBackend {
    pub async fn start() -> Self {
        Self::start_with(Router::new()).await
    }

    /// Serve `extra` routes first; everything else gets a canned reply.
    pub async fn start_with(extra: Router) -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new()
            .fallback(reply)
            .with_state(state.clone())
            .merge(extra);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Answer `method path` (path below `/api`) with `status` and a raw body.
    pub fn on(&self, method: &str, path: &str, status: u16, body: impl Into<String>) {
        self.state
            .replies
            .lock()
            .insert((method.to_string(), format!("/api{path}")), (status, body.into()));
    }

    pub fn on_json(&self, method: &str, path: &str, status: u16, body: Value) {
        self.on(method, path, status, body.to_string());
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request recorded")
    }

    pub fn config(&self) -> Config {
        Config::with_origin(
            &format!("http://{}/api", self.addr),
            &format!("ws://{}/ws", self.addr),
        )
    }
}

async fn reply(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let query = uri
        .query()
        .map(|q| {
            q.split('&')
                .filter_map(|pair| pair.split_once('='))
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .unwrap_or_default();

    state.requests.lock().push(Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        query,
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_str(&body).ok(),
    });

    let canned = state
        .replies
        .lock()
        .get(&(method.to_string(), uri.path().to_string()))
        .cloned();
    match canned {
        Some((status, body)) => (
            StatusCode::from_u16(status).unwrap(),
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, r#"{"detail":"Not Found"}"#).into_response(),
    }
}

/// A gateway plus the pieces a test wants to look at.
pub struct TestClient {
    pub gateway: Gateway,
    pub session: Arc<Session>,
    pub notifier: Arc<RecordingNotifier>,
    pub storage: Arc<MemoryStore>,
}

pub fn client(config: &Config) -> TestClient {
    client_with_store(config, MemoryStore::new())
}

pub fn client_with_store(config: &Config, store: MemoryStore) -> TestClient {
    let storage = Arc::new(store);
    let session = Arc::new(Session::restore(storage.clone()));
    let notifier = Arc::new(RecordingNotifier::new());
    let gateway = Gateway::new(config, session.clone(), notifier.clone()).expect("gateway");
    TestClient {
        gateway,
        session,
        notifier,
        storage,
    }
}

/// A client whose session already holds `token`.
pub fn logged_in_client(config: &Config, token: &str) -> TestClient {
    client_with_store(
        config,
        MemoryStore::with_entries([
            (admin_client::storage::TOKEN_KEY, token),
            (admin_client::storage::REFRESH_TOKEN_KEY, "refresh-1"),
        ]),
    )
}
