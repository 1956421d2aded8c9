use crate::{
    native_link::NativeLink,
    port::{Connector, Port},
};
use serde_json::Value;
use std::future::Future;
use tokio::sync::mpsc;

/// Hands new app ports to a running [`Relay`], the `runtime.onConnect` seam.
#[derive(Debug, Clone)]
pub struct RelayHandle {
    connections: mpsc::UnboundedSender<Port>,
}

impl RelayHandle {
    /// Open a port to the relay and return the page's end. `None` once the
    /// relay is gone.
    pub fn connect_app(&self, name: impl Into<String>) -> Option<Port> {
        let (page, worker) = Port::pair(name);
        self.connections.send(worker).ok()?;
        Some(page)
    }
}

/// Privileged-context forwarder.
///
/// Tracks at most one app port. A page that connects supersedes the previous
/// one with no cleanup, and native messages that arrive while no page is
/// connected are dropped.
pub struct Relay<C> {
    native: NativeLink<C>,
    app: Option<Port>,
    connections: mpsc::UnboundedReceiver<Port>,
    handle: RelayHandle,
}

impl<C: Connector> Relay<C> {
    pub fn new(native: NativeLink<C>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            native,
            app: None,
            connections: rx,
            handle: RelayHandle { connections: tx },
        }
    }

    pub fn handle(&self) -> RelayHandle {
        self.handle.clone()
    }

    pub fn native(&self) -> &NativeLink<C> {
        &self.native
    }

    pub fn has_app(&self) -> bool {
        self.app.is_some()
    }

    pub fn on_connect_app(&mut self, port: Port) {
        tracing::info!(port = %port.name(), "app connected");
        if self.app.replace(port).is_some() {
            tracing::debug!("previous app port superseded");
        }
    }

    pub fn forward_to_native(&mut self, message: Value) -> bool {
        self.native.post(message)
    }

    /// Returns false when the message was dropped.
    pub fn forward_to_app(&self, message: Value) -> bool {
        match &self.app {
            Some(port) => {
                let sent = port.post_message(message);
                if !sent {
                    tracing::debug!("app port closed, native message dropped");
                }
                sent
            }
            None => {
                tracing::debug!("no app connected, native message dropped");
                false
            }
        }
    }

    /// Event loop; returns when `shutdown` resolves.
    pub async fn run<S>(mut self, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("relay shutting down");
                    return;
                }
                Some(port) = self.connections.recv() => self.on_connect_app(port),
                // Native before app: page traffic must not starve the host side.
                message = self.native.recv() => {
                    self.forward_to_app(message);
                }
                message = recv_app(&mut self.app) => match message {
                    Some(message) => {
                        self.forward_to_native(message);
                    }
                    None => {
                        tracing::debug!("app port disconnected");
                        self.app = None;
                    }
                },
            }
        }
    }
}

async fn recv_app(app: &mut Option<Port>) -> Option<Value> {
    match app {
        Some(port) => port.recv().await,
        None => std::future::pending().await,
    }
}
