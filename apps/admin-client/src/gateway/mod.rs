//! Request gateway: the single HTTP client every API function goes through.
//!
//! Outbound, it either diverts to the mock backend or attaches the bearer
//! token. Inbound, it unwraps envelopes and turns every failure into exactly
//! one user notification plus a typed [`ClientError`]. It never retries.

pub mod envelope;
pub mod status;

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::ClientError;
use crate::mock::MockBackend;
use crate::notify::{Notification, Notifier};
use crate::session::Session;

use envelope::{Outcome, ResponseBody};
use status::{
    server_detail, status_message, GENERIC_FAILURE, NETWORK_FAILURE, SESSION_EXPIRED,
    SESSION_EXPIRED_NOTICE,
};

/// Route the dashboard sends the user to when the session ends.
pub const LOGIN_ROUTE: &str = "/login";

/// One outbound call, in the form both the network and the mock backend see.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<Value>,
    pub body: Option<Value>,
    /// Set when the query or body could not be serialized; the request is
    /// then never sent.
    error: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            body: None,
            error: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Self {
        match serde_json::to_value(query) {
            Ok(value) => self.query = Some(value),
            Err(e) => self.error = Some(e.to_string()),
        }
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.body = Some(value),
            Err(e) => self.error = Some(e.to_string()),
        }
        self
    }

    /// A query parameter as a string, for routing and filtering.
    pub fn query_str(&self, key: &str) -> Option<String> {
        match self.query.as_ref()?.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// A body field, for routing and filtering.
    pub fn body_field(&self, key: &str) -> Option<&Value> {
        self.body.as_ref()?.get(key)
    }
}

#[derive(Clone)]
pub struct Gateway {
    base_url: String,
    http: reqwest::Client,
    session: Arc<Session>,
    notifier: Arc<dyn Notifier>,
    mock: Option<Arc<MockBackend>>,
}

impl Gateway {
    /// Build a gateway from configuration. `USE_MOCK` installs the fixture
    /// backend with the configured latency.
    pub fn new(
        config: &Config,
        session: Arc<Session>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                tracing::error!(?e, "failed to build HTTP client");
                ClientError::InvalidRequest(e.to_string())
            })?;

        let mock = config
            .use_mock
            .then(|| Arc::new(MockBackend::new().with_latency(config.mock_latency)));
        if mock.is_some() {
            tracing::info!("request gateway running against mock fixtures");
        }

        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            http,
            session,
            notifier,
            mock,
        })
    }

    /// Replace the network with the given fixture backend.
    pub fn with_mock(mut self, mock: MockBackend) -> Self {
        self.mock = Some(Arc::new(mock));
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn get_with<T, Q>(&self, path: &str, query: &Q) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(ApiRequest::get(path).query(query)).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(ApiRequest::post(path).json(body)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(ApiRequest::put(path).json(body)).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(ApiRequest::patch(path).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Dispatch a request and decode the unwrapped payload into `T`.
    pub async fn send<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T, ClientError> {
        let value = self.dispatch(req).await?;
        serde_json::from_value(value).map_err(|e| self.reject(ClientError::from(e)))
    }

    /// Dispatch a request whose body is a file (e.g. a CSV export).
    pub async fn download(&self, req: ApiRequest) -> Result<Vec<u8>, ClientError> {
        self.check_built(&req)?;

        if let Some(mock) = &self.mock {
            let value = self.respond_from_mock(mock, &req).await?;
            return Ok(match value {
                Value::String(s) => s.into_bytes(),
                other => other.to_string().into_bytes(),
            });
        }

        let response = self.execute(&req).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_failure(e))?;
        Ok(bytes.to_vec())
    }

    async fn dispatch(&self, req: ApiRequest) -> Result<Value, ClientError> {
        self.check_built(&req)?;

        if let Some(mock) = &self.mock {
            return self.respond_from_mock(mock, &req).await;
        }

        let response = self.execute(&req).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_failure(e))?;
        let body = ResponseBody::parse(&bytes).map_err(|e| self.reject(ClientError::from(e)))?;

        match body.classify() {
            Outcome::Data(value) => Ok(value),
            Outcome::Expired(message) => {
                tracing::info!(path = %req.path, "session expired");
                self.notifier.notify(Notification::error(SESSION_EXPIRED_NOTICE));
                self.force_logout();
                Err(ClientError::SessionExpired(
                    message.unwrap_or_else(|| SESSION_EXPIRED.to_string()),
                ))
            }
            Outcome::Failed { code, message } => {
                let message = message.unwrap_or_else(|| GENERIC_FAILURE.to_string());
                tracing::debug!(path = %req.path, code, %message, "request rejected");
                Err(self.reject(ClientError::RequestFailed(message)))
            }
        }
    }

    fn check_built(&self, req: &ApiRequest) -> Result<(), ClientError> {
        match &req.error {
            Some(reason) => {
                tracing::error!(path = %req.path, %reason, "request could not be built");
                self.notifier.notify(Notification::error(GENERIC_FAILURE));
                Err(ClientError::InvalidRequest(reason.clone()))
            }
            None => Ok(()),
        }
    }

    async fn respond_from_mock(
        &self,
        mock: &MockBackend,
        req: &ApiRequest,
    ) -> Result<Value, ClientError> {
        mock.respond(req).await.map_err(|e| self.reject(e))
    }

    /// Send over the network; non-2xx statuses come back as errors.
    async fn execute(&self, req: &ApiRequest) -> Result<reqwest::Response, ClientError> {
        let url = format!("{}{}", self.base_url, req.path);
        let mut builder = self.http.request(req.method.clone(), &url);
        if let Some(query) = &req.query {
            builder = builder.query(query);
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }
        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(method = %req.method, %url, "dispatching request");
        let response = builder.send().await.map_err(|e| self.transport_failure(e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(self.status_failure(status.as_u16(), &body))
    }

    fn status_failure(&self, status: u16, body: &str) -> ClientError {
        let notice = status_message(status);
        let message = server_detail(body).unwrap_or_else(|| notice.clone());
        tracing::warn!(status, %message, "request failed with HTTP error");

        self.notifier.notify(Notification::error(notice));
        if status == 401 {
            self.force_logout();
            return ClientError::Auth(message);
        }
        ClientError::Http { status, message }
    }

    fn transport_failure(&self, err: reqwest::Error) -> ClientError {
        if err.is_builder() {
            tracing::error!(?err, "request could not be built");
            self.notifier.notify(Notification::error(GENERIC_FAILURE));
            return ClientError::InvalidRequest(err.to_string());
        }
        tracing::warn!(?err, timeout = err.is_timeout(), "no response from backend");
        self.notifier.notify(Notification::error(NETWORK_FAILURE));
        ClientError::Network(NETWORK_FAILURE.to_string())
    }

    /// Surface an error to the user once and hand it back.
    pub fn reject(&self, err: ClientError) -> ClientError {
        self.notifier.notify(Notification::error(err.to_string()));
        err
    }

    fn force_logout(&self) {
        self.session.logout();
        self.notifier.navigate(LOGIN_ROUTE);
    }
}
