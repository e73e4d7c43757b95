use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use admin_client::api::{auth, dashboard};
use admin_client::config::Config;
use admin_client::notify::TracingNotifier;
use admin_client::storage::{FileStore, KeyValueStore};
use admin_client::AdminClient;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file (silently skip if missing; env vars may be set externally)
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(
        api = %config.api_base_url,
        ws = %config.ws_url,
        mock = config.use_mock,
        "admin-console configured"
    );

    let storage: Arc<dyn KeyValueStore> = match FileStore::open(&config.session_file) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(%e, path = %config.session_file.display(), "cannot open session file");
            return ExitCode::FAILURE;
        }
    };

    let client = match AdminClient::new(config, storage, Arc::new(TracingNotifier)) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(%e, "failed to build client");
            return ExitCode::FAILURE;
        }
    };

    if !client.session.is_logged_in() {
        let (Some(username), Some(password)) = (
            client.config.admin_username.clone(),
            client.config.admin_password.clone(),
        ) else {
            tracing::error!("not logged in and ADMIN_USERNAME/ADMIN_PASSWORD are not set");
            return ExitCode::FAILURE;
        };
        if let Err(e) = auth::login(&client.gateway, &username, &password).await {
            tracing::error!(%e, "login failed");
            return ExitCode::FAILURE;
        }
    }

    if let Some(user) = client.session.user() {
        tracing::info!(username = %user.username, role = %user.role, "session active");
    }

    match dashboard::dashboard_stats(&client.gateway).await {
        Ok(today) => tracing::info!(
            orders = today.order_count,
            sales = today.total_sales,
            new_users = today.new_users,
            "today's statistics"
        ),
        Err(e) => tracing::warn!(%e, "could not load today's statistics"),
    }

    let live = client.live_channel();
    if let Some(token) = client.session.token() {
        live.connect(&token);
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(%e, "failed to listen for ctrl-c");
    }
    tracing::info!("shutting down");
    live.disconnect();

    ExitCode::SUCCESS
}
