//! Connection to the native host, with reconnection.
//!
//! ```text
//!   start ──► Connected ──(peer drops)──► Reconnecting ──(250 ms)──► Connected
//! ```
//!
//! There is no terminal state and no backoff: the host is a local executable
//! expected to come back quickly. Traffic in either direction during the gap is
//! dropped.

use crate::port::{Connector, Port};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

/// Fixed delay between a disconnect and the next connection attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_millis(250);

/// Native host id for an extension's declared name: a trailing `_bridge`
/// becomes `_host`. Names without the suffix are returned unchanged.
pub fn native_host_id(extension_name: &str) -> String {
    match extension_name.strip_suffix("_bridge") {
        Some(stem) => format!("{stem}_host"),
        None => extension_name.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Connected,
    Reconnecting,
}

enum State {
    Connected(Port),
    Reconnecting { deadline: Instant },
}

pub struct NativeLink<C> {
    connector: C,
    host_id: String,
    state: State,
    connects: u64,
}

impl<C: Connector> NativeLink<C> {
    /// Connects immediately. `host_id` is kept for every later reconnect.
    pub fn start(mut connector: C, host_id: impl Into<String>) -> Self {
        let host_id = host_id.into();
        tracing::info!(host = %host_id, "connecting to native host");
        let port = connector.connect(&host_id);
        Self {
            connector,
            host_id,
            state: State::Connected(port),
            connects: 1,
        }
    }

    pub fn host_id(&self) -> &str {
        &self.host_id
    }

    pub fn status(&self) -> LinkStatus {
        match self.state {
            State::Connected(_) => LinkStatus::Connected,
            State::Reconnecting { .. } => LinkStatus::Reconnecting,
        }
    }

    /// Number of connections created so far, the initial one included.
    pub fn connect_count(&self) -> u64 {
        self.connects
    }

    /// Forward to the host. Returns false when the message was dropped because
    /// the link is down.
    ///
    /// A closed port seen here schedules the reconnect, and a post after the
    /// deadline performs it, so a link that is only written to still recovers.
    pub fn post(&mut self, message: Value) -> bool {
        if let State::Reconnecting { deadline } = self.state {
            if Instant::now() < deadline {
                tracing::debug!(host = %self.host_id, "reconnecting, message dropped");
                return false;
            }
            self.reconnect();
        }
        let State::Connected(port) = &self.state else {
            return false;
        };
        if port.post_message(message) {
            return true;
        }
        tracing::debug!(host = %self.host_id, "native port closed, message dropped");
        self.on_disconnect();
        false
    }

    /// Next message from the host. Never returns while the host stays away;
    /// disconnects and reconnects happen inside.
    ///
    /// Cancel safe: a pending reconnect keeps its original deadline.
    pub async fn recv(&mut self) -> Value {
        loop {
            match &mut self.state {
                State::Connected(port) => {
                    if let Some(message) = port.recv().await {
                        return message;
                    }
                }
                State::Reconnecting { deadline } => {
                    let deadline = *deadline;
                    tokio::time::sleep_until(deadline).await;
                    self.reconnect();
                    continue;
                }
            }
            self.on_disconnect();
        }
    }

    fn on_disconnect(&mut self) {
        tracing::warn!(
            host = %self.host_id,
            delay_ms = RECONNECT_DELAY.as_millis() as u64,
            "native host disconnected, scheduling reconnect"
        );
        // Replacing the state drops the dead port and everything bound to it.
        self.state = State::Reconnecting {
            deadline: Instant::now() + RECONNECT_DELAY,
        };
    }

    fn reconnect(&mut self) {
        let port = self.connector.connect(&self.host_id);
        self.connects += 1;
        tracing::info!(host = %self.host_id, attempt = self.connects, "reconnected to native host");
        self.state = State::Connected(port);
    }
}
