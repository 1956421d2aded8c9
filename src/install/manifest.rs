use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Id Chromium assigns to an unpacked extension loaded from `path`.
///
/// First 32 hex digits of the SHA-256 of the path, each digit `0-f` mapped to a
/// letter `a-p`. Pass the canonical path; the browser hashes the resolved one.
///
/// # Examples
///
/// ```
/// use native_bridge::install::manifest::extension_id;
///
/// let id = extension_id(std::path::Path::new("/opt/acme/bridge"));
/// assert_eq!(id.len(), 32);
/// assert!(id.chars().all(|c| ('a'..='p').contains(&c)));
/// ```
pub fn extension_id(path: &Path) -> String {
    let digest = Sha256::digest(path.to_string_lossy().as_bytes());
    format!("{:x}", digest)
        .chars()
        .take(32)
        .filter_map(|c| c.to_digit(16))
        .map(|d| (b'a' + d as u8) as char)
        .collect()
}

/// Represents a native messaging host manifest.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HostManifest {
    pub name: String,
    pub description: String,
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub kind: String,
    pub allowed_origins: Vec<String>,
}

impl HostManifest {
    /// Manifest for `{app_name}_host`, reachable only from the extension
    /// with `extension_id`.
    pub fn new(app_name: &str, description: &str, host_path: &Path, extension_id: &str) -> Self {
        Self {
            name: format!("{app_name}_host"),
            description: description.to_string(),
            path: host_path.to_path_buf(),
            kind: "stdio".to_string(),
            allowed_origins: vec![format!("chrome-extension://{extension_id}/")],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Background {
    pub service_worker: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContentScript {
    pub matches: Vec<String>,
    pub js: Vec<String>,
}

/// Manifest V3 for the bridge extension: a module service worker running the
/// relay and a content script injected into the app page.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BridgeManifest {
    pub manifest_version: u32,
    pub name: String,
    pub version: String,
    pub background: Background,
    pub content_scripts: Vec<ContentScript>,
    pub permissions: Vec<String>,
    pub host_permissions: Vec<String>,
}

impl BridgeManifest {
    pub fn new(app_name: &str, app_version: &str) -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            manifest_version: 3,
            name: format!("{app_name}_bridge"),
            version: app_version.to_string(),
            background: Background {
                service_worker: "lib/worker.js".to_string(),
                kind: "module".to_string(),
            },
            content_scripts: vec![ContentScript {
                matches: strings(&["http://*/*", "file:///*"]),
                js: strings(&["lib/content.js"]),
            }],
            permissions: strings(&[
                "nativeMessaging",
                "storage",
                "unlimitedStorage",
                "clipboardRead",
                "clipboardWrite",
                "geolocation",
            ]),
            host_permissions: strings(&["http://*/"]),
        }
    }
}

/// Write `manifest` as pretty JSON to `path`, creating parent directories.
pub fn write_host_manifest(manifest: &HostManifest, path: &Path) -> Result<()> {
    if cfg!(unix) && !manifest.path.is_absolute() {
        return Err(BridgeError::Config(format!(
            "host path must be absolute on this platform: {}",
            manifest.path.display()
        )));
    }
    tracing::info!(path = %path.display(), host = %manifest.name, "writing host manifest");
    write_json(path, manifest)
}

/// Write `manifest.json` into the extension directory.
pub fn write_bridge_manifest(manifest: &BridgeManifest, bridge_dir: &Path) -> Result<PathBuf> {
    let path = bridge_dir.join("manifest.json");
    tracing::info!(path = %path.display(), name = %manifest.name, "writing bridge manifest");
    write_json(&path, manifest)?;
    Ok(path)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
