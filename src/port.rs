//! Duplex message ports, the stand-in for extension runtime ports.
//!
//! A port pair behaves like `chrome.runtime.Port`: whatever one end posts, the
//! other end receives, in order. Dropping one end disconnects the other; its
//! [`Port::recv`] yields `None` once the already-delivered messages are drained.

use serde_json::Value;
use tokio::sync::mpsc;

/// Sending half of a port. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PortSender {
    tx: mpsc::UnboundedSender<Value>,
}

impl PortSender {
    /// Returns false if the peer is gone; the message is dropped.
    pub fn post_message(&self, message: Value) -> bool {
        self.tx.send(message).is_ok()
    }

    pub fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Receiving half of a split port.
#[derive(Debug)]
pub struct PortReceiver {
    rx: mpsc::UnboundedReceiver<Value>,
}

impl PortReceiver {
    pub async fn recv(&mut self) -> Option<Value> {
        self.rx.recv().await
    }
}

#[derive(Debug)]
pub struct Port {
    name: String,
    sender: PortSender,
    rx: mpsc::UnboundedReceiver<Value>,
}

impl Port {
    /// Two connected ends sharing `name`.
    pub fn pair(name: impl Into<String>) -> (Port, Port) {
        let name = name.into();
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        let a = Port {
            name: name.clone(),
            sender: PortSender { tx: b_tx },
            rx: a_rx,
        };
        let b = Port {
            name,
            sender: PortSender { tx: a_tx },
            rx: b_rx,
        };
        (a, b)
    }

    /// A port whose peer is already gone.
    pub fn disconnected(name: impl Into<String>) -> Port {
        let (port, _peer) = Port::pair(name);
        port
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn post_message(&self, message: Value) -> bool {
        self.sender.post_message(message)
    }

    pub fn sender(&self) -> PortSender {
        self.sender.clone()
    }

    /// Next message from the peer, or `None` once it has disconnected.
    ///
    /// Cancel safe.
    pub async fn recv(&mut self) -> Option<Value> {
        self.rx.recv().await
    }

    /// Separate the halves so sending and receiving can live in different tasks.
    pub fn split(self) -> (PortSender, PortReceiver) {
        (self.sender, PortReceiver { rx: self.rx })
    }

    /// Non-blocking variant of [`Port::recv`]; `None` when nothing is queued.
    pub fn try_recv(&mut self) -> Option<Value> {
        self.rx.try_recv().ok()
    }
}

/// Factory for native connections, the `runtime.connectNative` seam.
///
/// Connecting never fails outright: a host that cannot be reached yields a port
/// that is (or soon becomes) disconnected, and the caller's reconnect logic
/// deals with it like any other drop.
pub trait Connector {
    fn connect(&mut self, host_id: &str) -> Port;
}

impl<F> Connector for F
where
    F: FnMut(&str) -> Port,
{
    fn connect(&mut self, host_id: &str) -> Port {
        self(host_id)
    }
}
