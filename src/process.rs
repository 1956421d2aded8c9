//! [`Connector`] that runs the native host as a child process, the way the
//! browser does for `connectNative`.

use crate::{
    config::HostSection,
    error::BridgeError,
    framing::{read_frame, write_frame, MAX_FROM_BROWSER, MAX_TO_BROWSER},
    port::{Connector, Port, PortReceiver, PortSender},
};
use serde_json::Value;
use std::{path::PathBuf, process::Stdio};
use tokio::process::{ChildStdin, ChildStdout, Command};

#[derive(Debug, Clone)]
pub struct ProcessConnector {
    program: PathBuf,
    args: Vec<String>,
    max_message_bytes: usize,
}

impl ProcessConnector {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            max_message_bytes: MAX_FROM_BROWSER,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Cap on a single outgoing frame. Clamped to the browser -> host limit.
    pub fn max_message_bytes(mut self, limit: usize) -> Self {
        self.max_message_bytes = limit.min(MAX_FROM_BROWSER);
        self
    }

    pub fn from_config(host: &HostSection) -> Self {
        Self::new(host.program.clone())
            .args(host.args.iter().cloned())
            .max_message_bytes(host.max_message_bytes)
    }
}

impl Connector for ProcessConnector {
    /// Must be called within a tokio runtime.
    fn connect(&mut self, host_id: &str) -> Port {
        let mut child = match Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(host = %host_id, program = %self.program.display(), error = %e, "failed to start native host");
                return Port::disconnected(host_id);
            }
        };

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            tracing::error!(host = %host_id, "native host stdio not captured");
            return Port::disconnected(host_id);
        };

        let (ours, theirs) = Port::pair(host_id);
        let (inbound, outbound) = theirs.split();
        let host = host_id.to_string();
        let limit = self.max_message_bytes;

        tokio::spawn(write_loop(stdin, outbound, limit, host.clone()));
        tokio::spawn(async move {
            read_loop(stdout, inbound, &host).await;
            match child.wait().await {
                Ok(status) => tracing::debug!(host = %host, %status, "native host exited"),
                Err(e) => tracing::warn!(host = %host, error = %e, "waiting for native host failed"),
            }
        });

        ours
    }
}

// Ends when our port is dropped; closing stdin tells the host to exit.
async fn write_loop(mut stdin: ChildStdin, mut outbound: PortReceiver, limit: usize, host: String) {
    while let Some(message) = outbound.recv().await {
        match write_frame(&mut stdin, &message, limit).await {
            Ok(()) => {}
            Err(BridgeError::Io(e)) => {
                tracing::debug!(host = %host, error = %e, "native host stdin closed");
                return;
            }
            Err(e) => tracing::warn!(host = %host, error = %e, "dropping message to native host"),
        }
    }
}

// Ends on EOF or a framing fault; dropping `inbound` disconnects the port.
async fn read_loop(mut stdout: ChildStdout, inbound: PortSender, host: &str) {
    loop {
        let raw = match read_frame(&mut stdout, MAX_TO_BROWSER).await {
            Ok(raw) => raw,
            Err(e) if e.is_disconnect() => return,
            Err(e) => {
                tracing::warn!(host = %host, error = %e, "bad frame from native host, disconnecting");
                return;
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(message) => {
                if !inbound.post_message(message) {
                    return;
                }
            }
            Err(e) => tracing::warn!(host = %host, error = %e, "native host sent invalid json"),
        }
    }
}
