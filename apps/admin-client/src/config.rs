use std::path::PathBuf;
use std::time::Duration;

/// Admin client configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// REST base URL (e.g. `http://localhost:3000/api`).
    pub api_base_url: String,
    /// Live-update WebSocket endpoint, without the token query.
    pub ws_url: String,
    /// Serve every request from the in-memory fixtures instead of the network.
    pub use_mock: bool,
    /// Simulated latency for fixture responses.
    pub mock_latency: Duration,
    /// Client-side timeout for a single request.
    pub request_timeout: Duration,
    /// Fixed delay between live-channel reconnect attempts.
    pub reconnect_delay: Duration,
    /// Reconnect attempts before the live channel gives up.
    pub max_reconnect_attempts: u32,
    /// Where the console binary persists the session.
    pub session_file: PathBuf,
    /// Optional credentials the console logs in with when no session exists.
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".to_string(),
            ws_url: "ws://localhost:3000/ws".to_string(),
            use_mock: false,
            mock_latency: Duration::from_millis(300),
            request_timeout: Duration::from_secs(15),
            reconnect_delay: Duration::from_millis(3000),
            max_reconnect_attempts: 5,
            session_file: PathBuf::from(".admin-session.json"),
            admin_username: None,
            admin_password: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: std::env::var("API_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.api_base_url),
            ws_url: std::env::var("WS_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.ws_url),
            use_mock: std::env::var("USE_MOCK")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            mock_latency: parsed_var("MOCK_LATENCY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.mock_latency),
            request_timeout: parsed_var("REQUEST_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            reconnect_delay: parsed_var("RECONNECT_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.reconnect_delay),
            max_reconnect_attempts: parsed_var("MAX_RECONNECT_ATTEMPTS")
                .unwrap_or(defaults.max_reconnect_attempts),
            session_file: std::env::var("SESSION_FILE")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.session_file),
            admin_username: std::env::var("ADMIN_USERNAME").ok().filter(|s| !s.is_empty()),
            admin_password: std::env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty()),
        }
    }

    /// Same defaults, pointed at a different backend origin.
    pub fn with_origin(api_base_url: &str, ws_url: &str) -> Self {
        Self {
            api_base_url: api_base_url.to_string(),
            ws_url: ws_url.to_string(),
            ..Self::default()
        }
    }
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
