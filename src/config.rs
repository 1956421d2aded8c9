//! Bridge configuration (strict TOML parsing).
//!
//! ```toml
//! [bridge]
//! extension_name = "acme_bridge"
//!
//! [host]
//! program = "/opt/acme/acme-host"
//!
//! [app]
//! name = "acme"
//! title = "Acme"
//! version = "1.0.0"
//! ```

use crate::{
    bus::DEFAULT_CASCADE_LIMIT,
    error::{BridgeError, Result},
    framing::MAX_FROM_BROWSER,
    native_link::native_host_id,
};
use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<BridgeConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)
        .map_err(|e| BridgeError::Config(format!("read {} failed: {e}", path.display())))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<BridgeConfig> {
    let cfg: BridgeConfig =
        toml::from_str(s).map_err(|e| BridgeError::Config(format!("invalid toml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    pub bridge: BridgeSection,

    #[serde(default)]
    pub host: Option<HostSection>,

    #[serde(default)]
    pub app: Option<AppSection>,
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<()> {
        self.bridge.validate()?;
        if let Some(host) = &self.host {
            host.validate()?;
        }
        if let Some(app) = &self.app {
            app.validate()?;
        }
        Ok(())
    }

    /// Id the native host is registered under, derived from the extension name.
    pub fn native_host_id(&self) -> String {
        native_host_id(&self.bridge.extension_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeSection {
    /// The extension's declared name, e.g. `acme_bridge`.
    pub extension_name: String,

    /// Most bus messages a single post may cascade into.
    #[serde(default = "default_cascade_limit")]
    pub cascade_limit: usize,
}

impl BridgeSection {
    pub fn validate(&self) -> Result<()> {
        if self.extension_name.trim().is_empty() {
            return Err(BridgeError::Config(
                "bridge.extension_name must not be empty".into(),
            ));
        }
        if self.cascade_limit == 0 {
            return Err(BridgeError::Config(
                "bridge.cascade_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostSection {
    pub program: PathBuf,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

impl HostSection {
    pub fn validate(&self) -> Result<()> {
        if self.program.as_os_str().is_empty() {
            return Err(BridgeError::Config("host.program must not be empty".into()));
        }
        if self.max_message_bytes == 0 || self.max_message_bytes > MAX_FROM_BROWSER {
            return Err(BridgeError::Config(format!(
                "host.max_message_bytes must be between 1 and {MAX_FROM_BROWSER}"
            )));
        }
        Ok(())
    }
}

/// Application identity used for manifests and browser launch.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppSection {
    pub name: String,
    pub title: String,
    pub version: String,

    /// Unpacked extension directory, relative to the app directory unless
    /// absolute. Defaults to `bridge`.
    #[serde(default = "default_bridge_dir")]
    pub bridge_dir: PathBuf,
}

impl AppSection {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BridgeError::Config("app.name must not be empty".into()));
        }
        if self.version.trim().is_empty() {
            return Err(BridgeError::Config("app.version must not be empty".into()));
        }
        if self.bridge_dir.as_os_str().is_empty() {
            return Err(BridgeError::Config("app.bridge_dir must not be empty".into()));
        }
        Ok(())
    }

    pub fn extension_name(&self) -> String {
        format!("{}_bridge", self.name)
    }

    pub fn host_name(&self) -> String {
        format!("{}_host", self.name)
    }
}

fn default_cascade_limit() -> usize {
    DEFAULT_CASCADE_LIMIT
}

fn default_bridge_dir() -> PathBuf {
    PathBuf::from("bridge")
}

fn default_max_message_bytes() -> usize {
    MAX_FROM_BROWSER
}
