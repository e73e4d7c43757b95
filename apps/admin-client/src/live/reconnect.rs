//! Fixed-delay reconnect policy and a timer that can be cancelled.

use std::time::Duration;

use tokio::sync::watch;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub delay: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(3000),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            delay: config.reconnect_delay,
            max_attempts: config.max_reconnect_attempts,
        }
    }

    /// Whether another attempt is allowed after `attempts` reconnects.
    pub fn allows(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }
}

/// Owner side of a cancellation signal. Dropping it cancels too.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Observer side of a cancellation signal.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolves once the handle cancels or is dropped.
    pub async fn cancelled(&mut self) {
        // An error means the handle is gone, which counts as cancelled.
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Elapsed,
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
pub struct ReconnectTimer {
    delay: Duration,
}

impl ReconnectTimer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Sleep for the reconnect delay unless cancelled first.
    pub async fn wait(&self, signal: &mut CancelSignal) -> Wake {
        tokio::select! {
            _ = tokio::time::sleep(self.delay) => Wake::Elapsed,
            _ = signal.cancelled() => Wake::Cancelled,
        }
    }
}
