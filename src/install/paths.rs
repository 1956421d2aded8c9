use crate::error::{BridgeError, Result};
use std::{
    env,
    path::{Path, PathBuf},
};

/// Per-app data directory holding one browser profile per browser.
///
/// Windows: `%APPDATA%\<app>`; elsewhere `$HOME/.config/<app>`. Development
/// runs get a separate `development` subdirectory.
pub fn data_dir(app_name: &str, development: bool) -> Result<PathBuf> {
    let base = base_dir()?;
    let dir = base.join(app_name);
    Ok(if development {
        dir.join("development")
    } else {
        dir
    })
}

#[cfg(windows)]
fn base_dir() -> Result<PathBuf> {
    env::var_os("APPDATA")
        .map(PathBuf::from)
        .ok_or_else(|| BridgeError::Config("APPDATA not set".into()))
}

#[cfg(not(windows))]
fn base_dir() -> Result<PathBuf> {
    env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".config"))
        .ok_or_else(|| BridgeError::Config("HOME not set".into()))
}

/// Browser profile directory inside `data_dir`, keyed by the browser's
/// executable file name.
pub fn profile_dir(data_dir: &Path, browser: &str) -> PathBuf {
    data_dir.join(browser)
}

/// Where the browser running with `profile_dir` looks for the host manifest.
pub fn host_manifest_path(profile_dir: &Path, app_name: &str) -> PathBuf {
    profile_dir
        .join("NativeMessagingHosts")
        .join(format!("{app_name}_host.json"))
}

/// Registry key (under HKCU) pointing Chrome at the host manifest.
pub fn chrome_winreg_path(host_name: &str) -> String {
    format!(r"Software\Google\Chrome\NativeMessagingHosts\{host_name}")
}
