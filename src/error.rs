//! Crate-wide error type.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Everything that can go wrong inside the bridge.
///
/// Transport faults on the native link never reach callers; they are absorbed by
/// the reconnect loop. The variants here cover the local faults: framing, config,
/// remote-call dispatch and file reads.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Outgoing frame exceeds the host -> browser limit.
    #[error("outgoing message of {size} bytes exceeds {limit} bytes")]
    MessageTooLarge { size: usize, limit: usize },

    /// Incoming length prefix exceeds the accepted cap.
    #[error("incoming message of {size} bytes exceeds {limit} bytes")]
    IncomingTooLarge { size: usize, limit: usize },

    /// The peer closed the stream. Normal shutdown for a native host.
    #[error("peer disconnected")]
    Disconnected,

    #[error("unknown member: {0}")]
    UnknownMethod(String),

    #[error("invalid parameters for `{method}`: {reason}")]
    InvalidParameters { method: String, reason: String },

    #[error("listener panicked: {0}")]
    ListenerPanicked(String),

    #[error("config: {0}")]
    Config(String),

    /// A local file could not be read; `status` carries the underlying status text.
    #[error("failed to read {path:?}: {status}")]
    FileRead { path: PathBuf, status: String },
}

impl BridgeError {
    /// True for the end-of-stream condition a host should treat as a clean exit.
    pub fn is_disconnect(&self) -> bool {
        match self {
            BridgeError::Disconnected => true,
            BridgeError::Io(e) => e.kind() == io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}
