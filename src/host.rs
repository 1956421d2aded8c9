//! Native host side of the link: framed JSON over stdin/stdout.
//!
//! Stdout carries the protocol. Log to stderr (see [`crate::logging`]).

use crate::{
    error::{BridgeError, Result},
    framing::{decode_message, encode_message, MAX_FROM_BROWSER},
};
use serde::Serialize;
use std::{
    future::Future,
    io::{self, Write},
};

pub async fn get_message() -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let mut stdin = io::stdin();
        decode_message(&mut stdin, MAX_FROM_BROWSER)
    })
    .await
    .map_err(join_error)?
}

pub async fn send_message<T: Serialize>(msg: &T) -> Result<()> {
    let frame = encode_message(msg)?;
    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(&frame)?;
        stdout.flush()?;
        Ok(())
    })
    .await
    .map_err(join_error)?
}

/// Read messages until the browser closes stdin, handing each raw JSON string
/// to `handler`. Disconnect ends the loop with `Ok(())`; a handler error ends it
/// with that error.
pub async fn event_loop<F, Fut>(mut handler: F) -> Result<()>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    loop {
        let msg = match get_message().await {
            Ok(msg) => msg,
            Err(e) if e.is_disconnect() => {
                tracing::info!("browser closed stdin, host exiting");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        handler(msg).await?;
    }
}

fn join_error(e: tokio::task::JoinError) -> BridgeError {
    BridgeError::Io(io::Error::new(io::ErrorKind::Other, e))
}
