//! Native messaging wire framing: a 4-byte native-endian length prefix
//! followed by that many bytes of UTF-8 JSON.

use crate::error::{BridgeError, Result};
use serde::Serialize;
use std::io::{self, Read};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const MAX_TO_BROWSER: usize = 1_048_576; // 1 MB (host -> browser)
pub const MAX_FROM_BROWSER: usize = 64 * 1_048_576; // 64 MB (browser -> host)

/// Frame `msg`, refusing bodies longer than `limit`.
pub fn encode_frame<T: Serialize>(msg: &T, limit: usize) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(msg)?;
    if json.len() > limit {
        return Err(BridgeError::MessageTooLarge {
            size: json.len(),
            limit,
        });
    }
    let mut out = Vec::with_capacity(4 + json.len());
    out.extend_from_slice(&(json.len() as u32).to_ne_bytes());
    out.extend_from_slice(&json);
    Ok(out)
}

/// Host-side encoder: enforces the 1 MB host -> browser limit.
pub fn encode_message<T: Serialize>(msg: &T) -> Result<Vec<u8>> {
    encode_frame(msg, MAX_TO_BROWSER)
}

/// Decode a single framed message from a reader.
///
/// A clean EOF before the length prefix is [`BridgeError::Disconnected`].
pub fn decode_message<R: Read>(reader: &mut R, max_size: usize) -> Result<String> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).map_err(eof_as_disconnect)?;
    let body = check_len(u32::from_ne_bytes(len_buf) as usize, max_size)?;
    let mut buf = vec![0u8; body];
    reader.read_exact(&mut buf)?;
    into_utf8(buf)
}

/// Async counterpart of [`decode_message`].
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R, max_size: usize) -> Result<String> {
    let mut len_buf = [0u8; 4];
    reader
        .read_exact(&mut len_buf)
        .await
        .map_err(eof_as_disconnect)?;
    let body = check_len(u32::from_ne_bytes(len_buf) as usize, max_size)?;
    let mut buf = vec![0u8; body];
    reader.read_exact(&mut buf).await?;
    into_utf8(buf)
}

pub async fn write_frame<W, T>(writer: &mut W, msg: &T, limit: usize) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let frame = encode_frame(msg, limit)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

fn check_len(len: usize, max_size: usize) -> Result<usize> {
    let cap = max_size.min(MAX_FROM_BROWSER);
    if len > cap {
        return Err(BridgeError::IncomingTooLarge { size: len, limit: cap });
    }
    Ok(len)
}

fn into_utf8(buf: Vec<u8>) -> Result<String> {
    String::from_utf8(buf)
        .map_err(|e| BridgeError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

fn eof_as_disconnect(e: io::Error) -> BridgeError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        BridgeError::Disconnected
    } else {
        BridgeError::Io(e)
    }
}
