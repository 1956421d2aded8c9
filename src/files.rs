//! Local file access for the page, and the dev-server side of it.
//!
//! A page served over plain `http:` (the dev server) cannot open `file://`
//! URLs, so it asks for `/local-file/<percent-encoded path>` instead and the
//! dev server answers with the file's bytes. Any other scheme reads
//! `file://<path>` directly.

use crate::error::{BridgeError, Result};
use std::path::{Path, PathBuf};

pub const LOCAL_FILE_PREFIX: &str = "/local-file";

/// URL the page should request for `path`. `scheme` is the page's protocol,
/// with or without the trailing colon.
pub fn local_url(path: &str, scheme: &str) -> String {
    if scheme.trim_end_matches(':') == "http" {
        format!("{LOCAL_FILE_PREFIX}{path}")
    } else {
        format!("file://{path}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Not ours; hand the request to the next middleware.
    PassThrough,
    File(PathBuf),
}

/// Match a request URL against `/local-file(/[^?]*)`.
pub fn route(request_url: &str) -> Result<Route> {
    let Some(rest) = request_url.strip_prefix(LOCAL_FILE_PREFIX) else {
        return Ok(Route::PassThrough);
    };
    if !rest.starts_with('/') {
        return Ok(Route::PassThrough);
    }
    let encoded = rest.split('?').next().unwrap_or(rest);
    let decoded = urlencoding::decode(encoded).map_err(|e| BridgeError::FileRead {
        path: PathBuf::from(encoded),
        status: format!("malformed percent-encoding: {e}"),
    })?;
    Ok(Route::File(PathBuf::from(decoded.into_owned())))
}

/// Dev-server responder: `Ok(None)` means pass through, otherwise the file's
/// raw bytes.
pub async fn serve(request_url: &str) -> Result<Option<Vec<u8>>> {
    match route(request_url)? {
        Route::PassThrough => Ok(None),
        Route::File(path) => {
            tracing::debug!(path = %path.display(), "serving local file");
            read_bytes(&path).await.map(Some)
        }
    }
}

pub async fn read_file_as_string(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| file_read_error(path, e))
}

async fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| file_read_error(path, e))
}

fn file_read_error(path: &Path, e: std::io::Error) -> BridgeError {
    BridgeError::FileRead {
        path: path.to_path_buf(),
        status: e.to_string(),
    }
}
