//! Forwarding between the page and the native host.
//!
//! - [`content`]: the page-side half, window bus <-> app port.
//! - [`worker`]: the privileged half, app port <-> native link.

pub mod content;
pub mod worker;

pub use content::ContentBridge;
pub use worker::{Relay, RelayHandle};
