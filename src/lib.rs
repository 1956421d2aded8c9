//! # native_bridge
//!
//! Relay messages between an **in-page application**, a **browser extension**
//! and a **native messaging host**, so the page sees one logical duplex channel
//! to the native process.
//!
//! ```text
//!  app code -> PageChannel -> WindowBus -> ContentBridge -> app port -> Relay -> NativeLink -> host process
//! ```
//!
//! ---
//!
//! ## Delivery model (read this first)
//!
//! - **At-most-once, best effort.** Nothing is acknowledged or retried. A
//!   native message that arrives while no page is connected is dropped.
//! - **Reconnect gaps lose traffic.** When the host goes away the
//!   [`NativeLink`] waits a fixed [`RECONNECT_DELAY`] (250 ms) and connects again,
//!   forever. Anything sent during the gap is gone.
//! - **One page, one host.** A newly connected page silently replaces the old one.
//! - **Never log to stdout in a host.** Stdout carries the framed protocol; use
//!   [`logging::init`], which writes to stderr.
//!
//! ---
//!
//! ## Crate layout
//!
//! - [`envelope`]: the `{destination, payload}` wrapper used on the window bus.
//! - [`bus`]: single-threaded broadcast bus with queued re-entrant posts.
//! - [`channel`]: the page end, sending to the host and listening for app messages.
//! - [`remote`]: one-way remote calls (`Proxy`, `listen`, `MethodTable`).
//! - [`relay`]: content-script half and privileged half of the relay.
//! - [`native_link`]: connection to the host with reconnection.
//! - [`port`]: duplex ports and the [`Connector`] seam.
//! - [`process`]: connector that runs the host as a child process.
//! - [`framing`] / [`host`]: native messaging wire format and stdio loop.
//! - [`files`]: local file URLs and the dev-server responder.
//! - [`config`], [`logging`], [`error`]: ambient plumbing.
//! - `install` (feature `install`): manifests, extension id, browser launch.
//!
//! ---
//!
//! ## Page side
//!
//! ```
//! use native_bridge::{bus::WindowBus, channel::PageChannel, remote::{listen, proxy, MethodTable}};
//! use std::{cell::Cell, rc::Rc};
//!
//! let bus = WindowBus::new();
//! let channel = PageChannel::new(&bus);
//!
//! // Calls go out as {"destination":"host","payload":{"method":"ping","parameters":[]}}.
//! proxy(&channel).call("ping", vec![]);
//!
//! // Calls coming back from the host are dispatched by name.
//! let pongs = Rc::new(Cell::new(0));
//! let _sub = listen(
//!     &channel,
//!     MethodTable::new(pongs.clone()).method0("pong", |n| n.set(n.get() + 1)),
//! );
//! ```
//!
//! ## Privileged side
//!
//! ```no_run
//! use native_bridge::{native_host_id, NativeLink, ProcessConnector, Relay};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     native_bridge::logging::init();
//!     let link = NativeLink::start(
//!         ProcessConnector::new("/opt/acme/acme-host"),
//!         native_host_id("acme_bridge"),
//!     );
//!     let relay = Relay::new(link);
//!     let pages = relay.handle(); // hand out app ports with `pages.connect_app(..)`
//!     # let _ = pages;
//!     relay.run(std::future::pending::<()>()).await;
//! }
//! ```
//!
//! ## Host side
//!
//! ```no_run
//! use native_bridge::host::{event_loop, send_message};
//! use serde_json::Value;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> native_bridge::Result<()> {
//!     event_loop(|raw: String| async move {
//!         let msg: Value = serde_json::from_str(&raw)?;
//!         send_message(&msg).await
//!     })
//!     .await
//! }
//! ```
//!
//! When the browser closes stdin the loop returns `Ok(())`.

pub mod bus;
pub mod channel;
pub mod config;
pub mod envelope;
pub mod error;
pub mod files;
pub mod framing;
pub mod host;
pub mod logging;
pub mod native_link;
pub mod port;
pub mod process;
pub mod relay;
pub mod remote;

#[cfg(feature = "install")]
pub mod install;

#[doc(inline)]
pub use channel::PageChannel;
#[doc(inline)]
pub use envelope::{Destination, Envelope};
#[doc(inline)]
pub use error::{BridgeError, Result};
#[doc(inline)]
pub use native_link::{native_host_id, LinkStatus, NativeLink, RECONNECT_DELAY};
#[doc(inline)]
pub use port::{Connector, Port};
#[doc(inline)]
pub use process::ProcessConnector;
#[doc(inline)]
pub use relay::{ContentBridge, Relay, RelayHandle};
#[doc(inline)]
pub use remote::{listen, proxy, MethodTable, Proxy, RemoteCall, Service};
