pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod live;
pub mod mock;
pub mod notify;
pub mod session;
pub mod storage;

use std::sync::Arc;

use config::Config;
use error::ClientError;
use gateway::Gateway;
use live::{LiveChannel, ReconnectPolicy, WsConnector};
use notify::Notifier;
use session::Session;
use storage::KeyValueStore;

/// Everything an embedding front end needs, wired from one configuration.
#[derive(Clone)]
pub struct AdminClient {
    pub config: Arc<Config>,
    pub session: Arc<Session>,
    pub gateway: Gateway,
    pub notifier: Arc<dyn Notifier>,
}

impl AdminClient {
    /// Restore the session from `storage` and build the gateway over it.
    pub fn new(
        config: Config,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ClientError> {
        let session = Arc::new(Session::restore(storage));
        let gateway = Gateway::new(&config, session.clone(), notifier.clone())?;
        Ok(Self {
            config: Arc::new(config),
            session,
            gateway,
            notifier,
        })
    }

    /// A live channel to the configured WebSocket endpoint. Not connected.
    pub fn live_channel(&self) -> LiveChannel {
        LiveChannel::new(
            self.config.ws_url.clone(),
            Arc::new(WsConnector),
            self.notifier.clone(),
            ReconnectPolicy::from_config(&self.config),
        )
    }
}
