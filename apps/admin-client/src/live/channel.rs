//! The live-update channel and the supervisor task that keeps it open.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};

use crate::notify::Notifier;

use super::connector::{Connector, Transport};
use super::events::{Frame, LiveEvent};
use super::reconnect::{cancel_pair, CancelHandle, CancelSignal, ReconnectPolicy, ReconnectTimer, Wake};

/// Capacity of the event broadcast. Slow subscribers skip events.
const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
    /// Reconnect attempts are exhausted. A new `connect` starts over.
    GaveUp,
}

struct Inner {
    state: ChannelState,
    attempts: u32,
    /// Bumped by every `connect` and `disconnect`. A supervisor only touches
    /// this struct while its own generation is current.
    generation: u64,
    cancel: Option<CancelHandle>,
    outbound: Option<mpsc::UnboundedSender<Value>>,
}

struct Shared {
    inner: Mutex<Inner>,
    events: broadcast::Sender<LiveEvent>,
    notifier: Arc<dyn Notifier>,
}

pub struct LiveChannel {
    url: String,
    connector: Arc<dyn Connector>,
    policy: ReconnectPolicy,
    shared: Arc<Shared>,
}

impl LiveChannel {
    pub fn new(
        url: impl Into<String>,
        connector: Arc<dyn Connector>,
        notifier: Arc<dyn Notifier>,
        policy: ReconnectPolicy,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            url: url.into(),
            connector,
            policy,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: ChannelState::Disconnected,
                    attempts: 0,
                    generation: 0,
                    cancel: None,
                    outbound: None,
                }),
                events,
                notifier,
            }),
        }
    }

    pub fn state(&self) -> ChannelState {
        self.shared.inner.lock().state
    }

    /// Reconnect attempts since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.shared.inner.lock().attempts
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ChannelState::Connected
    }

    /// Every parsed event, in arrival order.
    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.shared.events.subscribe()
    }

    /// Open the channel for `token`.
    ///
    /// Does nothing while a connection is open or being opened. A reconnect
    /// that is only waiting out its delay has no socket, so it is cancelled
    /// and replaced. Either way the new supervisor task dials `token` with a
    /// fresh attempt counter. Must be called inside a tokio runtime.
    pub fn connect(&self, token: &str) {
        if token.is_empty() {
            tracing::warn!("live channel needs a token, not connecting");
            return;
        }

        let (generation, signal) = {
            let mut inner = self.shared.inner.lock();
            if let Some(pending) = inner.cancel.take() {
                if matches!(inner.state, ChannelState::Connected | ChannelState::Connecting) {
                    tracing::debug!(state = ?inner.state, "live channel already active");
                    inner.cancel = Some(pending);
                    return;
                }
                tracing::info!("replacing pending live channel reconnect");
                pending.cancel();
            }
            let (handle, signal) = cancel_pair();
            inner.generation += 1;
            inner.attempts = 0;
            inner.state = ChannelState::Connecting;
            inner.cancel = Some(handle);
            (inner.generation, signal)
        };

        let supervisor = Supervisor {
            url: socket_url(&self.url, token),
            generation,
            connector: self.connector.clone(),
            policy: self.policy,
            shared: self.shared.clone(),
        };
        tokio::spawn(supervisor.run(signal));
    }

    /// Queue a JSON frame for the server. Dropped, returning `false`, unless
    /// the channel is connected.
    pub fn send(&self, value: Value) -> bool {
        let inner = self.shared.inner.lock();
        match (inner.state, &inner.outbound) {
            (ChannelState::Connected, Some(tx)) => tx.send(value).is_ok(),
            _ => {
                tracing::debug!(state = ?inner.state, "live channel not connected, dropping frame");
                false
            }
        }
    }

    /// Cancel any pending reconnect, close the socket and mark the channel
    /// disconnected. Safe to call repeatedly.
    pub fn disconnect(&self) {
        let mut inner = self.shared.inner.lock();
        if let Some(cancel) = inner.cancel.take() {
            cancel.cancel();
            tracing::info!("live channel disconnected");
        }
        inner.generation += 1;
        inner.outbound = None;
        inner.state = ChannelState::Disconnected;
    }
}

impl Drop for LiveChannel {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn socket_url(base: &str, token: &str) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}token={token}")
}

struct Supervisor {
    url: String,
    generation: u64,
    connector: Arc<dyn Connector>,
    policy: ReconnectPolicy,
    shared: Arc<Shared>,
}

impl Supervisor {
    /// Apply `f` to the shared state unless a newer generation took over.
    fn current<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> Option<R> {
        let mut inner = self.shared.inner.lock();
        if inner.generation == self.generation {
            Some(f(&mut inner))
        } else {
            None
        }
    }

    async fn run(self, mut signal: CancelSignal) {
        let timer = ReconnectTimer::new(self.policy.delay);

        loop {
            if self
                .current(|inner| inner.state = ChannelState::Connecting)
                .is_none()
            {
                break;
            }

            let opened = tokio::select! {
                opened = self.connector.connect(&self.url) => opened,
                _ = signal.cancelled() => break,
            };

            match opened {
                Ok(mut transport) => {
                    let (tx, rx) = mpsc::unbounded_channel();
                    let accepted = self.current(|inner| {
                        inner.state = ChannelState::Connected;
                        inner.attempts = 0;
                        inner.outbound = Some(tx);
                    });
                    if accepted.is_none() {
                        transport.close().await;
                        break;
                    }
                    tracing::info!(generation = self.generation, "live channel connected");
                    self.pump(transport, rx, &mut signal).await;
                }
                Err(e) => tracing::warn!(%e, "live channel failed to connect"),
            }

            if signal.is_cancelled() {
                break;
            }

            let Some(attempts) = self.current(|inner| {
                inner.state = ChannelState::Disconnected;
                inner.outbound = None;
                inner.attempts
            }) else {
                break;
            };

            if !self.policy.allows(attempts) {
                tracing::warn!(attempts, "live channel giving up");
                self.current(|inner| {
                    inner.state = ChannelState::GaveUp;
                    inner.cancel = None;
                });
                break;
            }

            tracing::info!(
                attempt = attempts + 1,
                delay = ?self.policy.delay,
                "live channel reconnecting"
            );
            if timer.wait(&mut signal).await == Wake::Cancelled {
                break;
            }
            if self.current(|inner| inner.attempts += 1).is_none() {
                break;
            }
        }

        tracing::debug!(generation = self.generation, "live channel supervisor stopped");
    }

    /// Move frames both ways until the socket closes or the channel is
    /// cancelled.
    async fn pump(
        &self,
        mut transport: Box<dyn Transport>,
        mut outbound: mpsc::UnboundedReceiver<Value>,
        signal: &mut CancelSignal,
    ) {
        loop {
            tokio::select! {
                frame = transport.recv() => match frame {
                    Some(Ok(text)) => self.dispatch(&text),
                    Some(Err(e)) => {
                        tracing::warn!(%e, "live channel read failed");
                        break;
                    }
                    None => {
                        tracing::info!("live channel closed by server");
                        break;
                    }
                },
                Some(value) = outbound.recv() => {
                    if let Err(e) = transport.send(value.to_string()).await {
                        tracing::warn!(%e, "live channel write failed");
                        break;
                    }
                }
                _ = signal.cancelled() => {
                    transport.close().await;
                    break;
                }
            }
        }
    }

    fn dispatch(&self, text: &str) {
        match Frame::decode(text) {
            Ok(Frame::Event(event)) => {
                tracing::debug!(kind = event.kind(), order_id = event.order().id, "live event");
                self.shared.notifier.notify(event.notification());
                // No subscribers is fine.
                let _ = self.shared.events.send(event);
            }
            Ok(Frame::Unknown(kind)) => tracing::debug!(%kind, "ignoring live event"),
            Err(e) => tracing::error!(%e, "dropping malformed live frame"),
        }
    }
}
