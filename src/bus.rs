//! In-process stand-in for the page's window message bus.
//!
//! The bus is broadcast: every subscriber sees every posted message, including
//! the ones it posted itself. Dispatch is synchronous. A post made from inside
//! a subscriber is queued and delivered once the current message has reached
//! every subscriber, so dispatch never recurses. The number of messages a
//! single top-level post may trigger is capped by the cascade limit; the rest
//! of the queue is discarded when it is hit.

use serde_json::Value;
use std::{
    cell::RefCell,
    collections::VecDeque,
    panic::{catch_unwind, AssertUnwindSafe},
    rc::Rc,
};

pub const DEFAULT_CASCADE_LIMIT: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&Value)>;

struct Inner {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Handler)>,
    queue: VecDeque<Value>,
    dispatching: bool,
    cascade_limit: usize,
}

/// Cloning yields another handle to the same bus.
#[derive(Clone)]
pub struct WindowBus {
    inner: Rc<RefCell<Inner>>,
}

impl Default for WindowBus {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowBus {
    pub fn new() -> Self {
        Self::with_cascade_limit(DEFAULT_CASCADE_LIMIT)
    }

    pub fn with_cascade_limit(cascade_limit: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                next_id: 0,
                subscribers: Vec::new(),
                queue: VecDeque::new(),
                dispatching: false,
                cascade_limit: cascade_limit.max(1),
            })),
        }
    }

    pub fn subscribe(&self, handler: impl Fn(&Value) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.push((id, Rc::new(handler)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sid, _)| *sid != id);
        inner.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Fire-and-forget broadcast.
    pub fn post(&self, message: Value) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.queue.push_back(message);
            if inner.dispatching {
                return;
            }
            inner.dispatching = true;
        }

        let mut delivered = 0usize;
        loop {
            let (message, handlers) = {
                let mut inner = self.inner.borrow_mut();
                let Some(message) = inner.queue.pop_front() else {
                    inner.dispatching = false;
                    return;
                };
                delivered += 1;
                if delivered > inner.cascade_limit {
                    let dropped = inner.queue.len() + 1;
                    inner.queue.clear();
                    inner.dispatching = false;
                    tracing::warn!(
                        limit = inner.cascade_limit,
                        dropped,
                        "window bus cascade limit reached, dropping queued messages"
                    );
                    return;
                }
                let handlers: Vec<Handler> =
                    inner.subscribers.iter().map(|(_, h)| h.clone()).collect();
                (message, handlers)
            };

            for handler in handlers {
                if catch_unwind(AssertUnwindSafe(|| handler(&message))).is_err() {
                    tracing::error!("window bus subscriber panicked");
                }
            }
        }
    }
}
