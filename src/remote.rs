//! One-way remote calls over a [`PageChannel`].
//!
//! A [`Proxy`] turns `call("foo", [1, 2])` into the payload
//! `{"method": "foo", "parameters": [1, 2]}`. On the other side, [`listen`]
//! decodes such payloads and invokes a [`Service`]. Nothing comes back: there is
//! no response, no correlation id and no timeout.
//!
//! Method names are resolved through a [`MethodTable`] built up front, so an
//! unknown name is an explicit [`BridgeError::UnknownMethod`] for that message
//! and never stops later dispatches.

use crate::{
    channel::{ListenerId, PageChannel},
    error::{BridgeError, Result},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCall {
    pub method: String,
    #[serde(default)]
    pub parameters: Vec<Value>,
}

impl RemoteCall {
    pub fn new(method: impl Into<String>, parameters: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            parameters,
        }
    }
}

/// Calling side.
#[derive(Clone)]
pub struct Proxy {
    channel: PageChannel,
}

pub fn proxy(channel: &PageChannel) -> Proxy {
    Proxy {
        channel: channel.clone(),
    }
}

impl Proxy {
    pub fn call(&self, method: &str, parameters: Vec<Value>) {
        tracing::trace!(method, "remote call");
        // Serializing a String and a Vec<Value> cannot fail.
        let payload = serde_json::json!({ "method": method, "parameters": parameters });
        self.channel.send(payload);
    }

    /// `args` must serialize to a sequence (a tuple, array or `Vec`); `()`
    /// means no arguments.
    pub fn call_with<A: Serialize>(&self, method: &str, args: A) -> Result<()> {
        let parameters = match serde_json::to_value(args)? {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => {
                return Err(BridgeError::InvalidParameters {
                    method: method.to_string(),
                    reason: format!("arguments must serialize to a sequence, got {other}"),
                })
            }
        };
        self.call(method, parameters);
        Ok(())
    }
}

/// Receiving side of remote calls.
pub trait Service {
    fn invoke(&mut self, method: &str, parameters: Vec<Value>) -> Result<()>;
}

impl<F> Service for F
where
    F: FnMut(&str, Vec<Value>) -> Result<()>,
{
    fn invoke(&mut self, method: &str, parameters: Vec<Value>) -> Result<()> {
        self(method, parameters)
    }
}

type Handler<S> = Box<dyn FnMut(&mut S, Vec<Value>) -> Result<()>>;

/// Method-name lookup table over a target object.
///
/// ```
/// use native_bridge::remote::MethodTable;
///
/// let table = MethodTable::new(0i64)
///     .method0("reset", |n| *n = 0)
///     .method2("add", |n, a: i64, b: i64| *n += a + b);
/// # let _ = table;
/// ```
pub struct MethodTable<S> {
    target: S,
    handlers: HashMap<String, Handler<S>>,
}

impl<S> MethodTable<S> {
    pub fn new(target: S) -> Self {
        Self {
            target,
            handlers: HashMap::new(),
        }
    }

    pub fn target(&self) -> &S {
        &self.target
    }

    pub fn into_target(self) -> S {
        self.target
    }

    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Raw handler receiving the positional parameters as-is.
    pub fn method<F>(mut self, name: &str, handler: F) -> Self
    where
        F: FnMut(&mut S, Vec<Value>) -> Result<()> + 'static,
    {
        self.handlers.insert(name.to_string(), Box::new(handler));
        self
    }

    /// Extra parameters are ignored.
    pub fn method0<F>(self, name: &str, mut handler: F) -> Self
    where
        F: FnMut(&mut S) + 'static,
    {
        self.method(name, move |target, _| {
            handler(target);
            Ok(())
        })
    }

    /// Missing parameters decode from `null`, so `Option<_>` arguments are
    /// optional.
    pub fn method1<A, F>(self, name: &str, mut handler: F) -> Self
    where
        A: DeserializeOwned,
        F: FnMut(&mut S, A) + 'static,
    {
        let method = name.to_string();
        self.method(name, move |target, params| {
            let a = arg(&method, &params, 0)?;
            handler(target, a);
            Ok(())
        })
    }

    pub fn method2<A, B, F>(self, name: &str, mut handler: F) -> Self
    where
        A: DeserializeOwned,
        B: DeserializeOwned,
        F: FnMut(&mut S, A, B) + 'static,
    {
        let method = name.to_string();
        self.method(name, move |target, params| {
            let a = arg(&method, &params, 0)?;
            let b = arg(&method, &params, 1)?;
            handler(target, a, b);
            Ok(())
        })
    }
}

impl<S> Service for MethodTable<S> {
    fn invoke(&mut self, method: &str, parameters: Vec<Value>) -> Result<()> {
        let handler = self
            .handlers
            .get_mut(method)
            .ok_or_else(|| BridgeError::UnknownMethod(method.to_string()))?;
        handler(&mut self.target, parameters)
    }
}

fn arg<A: DeserializeOwned>(method: &str, params: &[Value], index: usize) -> Result<A> {
    let value = params.get(index).unwrap_or(&Value::Null);
    A::deserialize(value).map_err(|e| BridgeError::InvalidParameters {
        method: method.to_string(),
        reason: format!("argument {index}: {e}"),
    })
}

/// Keeps a [`listen`] registration alive. Dropping it unsubscribes.
pub struct Subscription {
    channel: PageChannel,
    id: Option<ListenerId>,
    faults: Rc<Cell<u64>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.remove();
    }

    /// Calls that failed so far (unknown method, bad parameters, malformed
    /// payload).
    pub fn faults(&self) -> u64 {
        self.faults.get()
    }

    fn remove(&mut self) {
        if let Some(id) = self.id.take() {
            self.channel.remove_listener(id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}

/// Dispatch every remote call arriving on `channel` to `service`.
///
/// Each failing call is logged and counted; it does not affect other listeners
/// or later calls.
pub fn listen<S: Service + 'static>(channel: &PageChannel, service: S) -> Subscription {
    let service = RefCell::new(service);
    let faults = Rc::new(Cell::new(0));
    let id = {
        let faults = faults.clone();
        channel.add_listener(move |payload| {
            let outcome = RemoteCall::deserialize(payload)
                .map_err(BridgeError::from)
                .and_then(|call| {
                    tracing::trace!(method = %call.method, "dispatching remote call");
                    service.borrow_mut().invoke(&call.method, call.parameters)
                });
            if outcome.is_err() {
                faults.set(faults.get() + 1);
            }
            outcome
        })
    };
    Subscription {
        channel: channel.clone(),
        id: Some(id),
        faults,
    }
}
