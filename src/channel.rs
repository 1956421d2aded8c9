//! Page-side end of the bridge.
//!
//! A [`PageChannel`] posts `host` envelopes onto the [`WindowBus`] and hands the
//! payload of every `app` envelope to its listeners.

use crate::{
    bus::{SubscriptionId, WindowBus},
    envelope::{Destination, Envelope},
    error::{BridgeError, Result},
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{
    cell::RefCell,
    panic::{catch_unwind, AssertUnwindSafe},
    rc::Rc,
};

/// Handle returned by [`PageChannel::add_listener`], used for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(&Value) -> Result<()>>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

struct Inner {
    bus: WindowBus,
    subscription: SubscriptionId,
    listeners: Rc<RefCell<Listeners>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscription);
    }
}

/// Clones share one listener list and one bus subscription. The subscription
/// is removed when the last clone is dropped.
#[derive(Clone)]
pub struct PageChannel {
    inner: Rc<Inner>,
}

impl PageChannel {
    pub fn new(bus: &WindowBus) -> Self {
        let listeners = Rc::new(RefCell::new(Listeners::default()));
        let subscription = {
            let listeners = listeners.clone();
            bus.subscribe(move |message| {
                if let Some(payload) = Envelope::open(message, Destination::App) {
                    dispatch(&listeners, payload);
                }
            })
        };
        Self {
            inner: Rc::new(Inner {
                bus: bus.clone(),
                subscription,
                listeners,
            }),
        }
    }

    /// Wrap `payload` as a `host` envelope and post it.
    pub fn send(&self, payload: Value) {
        self.inner.bus.post(Envelope::to_host(payload).into_value());
    }

    pub fn send_typed<T: Serialize>(&self, payload: &T) -> Result<()> {
        self.send(serde_json::to_value(payload)?);
        Ok(())
    }

    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Value) -> Result<()> + 'static,
    {
        let mut listeners = self.inner.listeners.borrow_mut();
        let id = ListenerId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, Rc::new(listener)));
        id
    }

    /// Listener that receives payloads decoded as `T`. A payload that does not
    /// decode counts as a fault of this listener only.
    pub fn add_typed_listener<T, F>(&self, listener: F) -> ListenerId
    where
        T: DeserializeOwned,
        F: Fn(T) -> Result<()> + 'static,
    {
        self.add_listener(move |payload| listener(serde_json::from_value(payload.clone())?))
    }

    /// No-op for ids that are not registered.
    pub fn remove_listener(&self, id: ListenerId) {
        self.inner
            .listeners
            .borrow_mut()
            .entries
            .retain(|(lid, _)| *lid != id);
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().entries.len()
    }

    pub fn bus(&self) -> &WindowBus {
        &self.inner.bus
    }
}

fn dispatch(listeners: &RefCell<Listeners>, payload: &Value) {
    // Snapshot so listeners may add/remove listeners while running.
    let snapshot: Vec<(ListenerId, Listener)> = listeners.borrow().entries.clone();
    for (id, listener) in snapshot {
        let outcome = catch_unwind(AssertUnwindSafe(|| listener(payload)))
            .unwrap_or_else(|panic| Err(BridgeError::ListenerPanicked(panic_message(&*panic))));
        if let Err(e) = outcome {
            tracing::warn!(listener = ?id, error = %e, "page listener failed");
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
