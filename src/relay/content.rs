use crate::{
    bus::{SubscriptionId, WindowBus},
    envelope::{Destination, Envelope},
    port::Port,
};

/// Moves `host` envelopes from the bus onto the app port, and app port messages
/// back onto the bus as `app` envelopes.
///
/// The bus subscription lives as long as the bridge.
pub struct ContentBridge {
    bus: WindowBus,
    subscription: SubscriptionId,
    port: Port,
}

impl ContentBridge {
    pub fn attach(bus: &WindowBus, port: Port) -> Self {
        let to_worker = port.sender();
        let subscription = bus.subscribe(move |message| {
            if let Some(payload) = Envelope::open(message, Destination::Host) {
                if !to_worker.post_message(payload.clone()) {
                    tracing::debug!("app port closed, page message dropped");
                }
            }
        });
        Self {
            bus: bus.clone(),
            subscription,
            port,
        }
    }

    /// Deliver everything arriving on the app port to the bus until the port
    /// disconnects.
    pub async fn pump(&mut self) {
        while let Some(message) = self.port.recv().await {
            self.bus.post(Envelope::to_app(message).into_value());
        }
        tracing::debug!(port = %self.port.name(), "app port disconnected");
    }
}

impl Drop for ContentBridge {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscription);
    }
}
