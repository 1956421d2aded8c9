//! The tagged wrapper carried on the window message bus.
//!
//! The bus is shared by everything running in the page, so the bridge only
//! reacts to objects shaped like
//!
//! ```json
//! { "destination": "host" | "app", "payload": <any> }
//! ```
//!
//! and ignores the rest.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which side of the bridge an envelope is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// The privileged extension context (and through it, the native host).
    Host,
    /// The in-page application.
    App,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    pub destination: Destination,
    pub payload: T,
}

impl<T> Envelope<T> {
    pub fn to_host(payload: T) -> Self {
        Self {
            destination: Destination::Host,
            payload,
        }
    }

    pub fn to_app(payload: T) -> Self {
        Self {
            destination: Destination::App,
            payload,
        }
    }
}

impl Envelope<Value> {
    /// Wire form posted onto the bus.
    pub fn into_value(self) -> Value {
        serde_json::json!({
            "destination": self.destination,
            "payload": self.payload,
        })
    }

    /// Pull the payload out of a bus message if it is tagged for `wanted`.
    ///
    /// Messages without the tag, with an unknown tag, or with the other tag
    /// yield `None`. A tagged message with no `payload` field carries `null`.
    pub fn open(message: &Value, wanted: Destination) -> Option<&Value> {
        let obj = message.as_object()?;
        // Only bare string tags; serde would also take the `{"app": null}` form.
        let tag = obj.get("destination").filter(|tag| tag.is_string())?;
        let tag = Destination::deserialize(tag).ok()?;
        if tag != wanted {
            return None;
        }
        Some(obj.get("payload").unwrap_or(&Value::Null))
    }
}
