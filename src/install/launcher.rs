use super::{manifest, paths};
use crate::{
    config::BridgeConfig,
    error::{BridgeError, Result},
};
use std::{
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
    process::Command,
};

/// Chromium-family executables we can load the bridge extension into, in
/// order of preference within a `PATH` entry.
#[cfg(windows)]
pub const SUPPORTED_BROWSERS: &[&str] = &["chrome.exe", "vivaldi.exe", "msedge.exe"];

#[cfg(not(windows))]
pub const SUPPORTED_BROWSERS: &[&str] = &[
    "chromium-browser",
    "google-chrome",
    "vivaldi",
    "microsoft-edge-stable",
];

pub const DEV_SERVER_URL: &str = "http://localhost:3000";

/// First supported browser found on `path_var` (a `PATH`-style list).
///
/// The earliest `PATH` entry holding any supported browser wins, the same
/// precedence a shell uses. Scanning stops there; later entries never
/// override it, even ones holding a browser listed earlier in
/// [`SUPPORTED_BROWSERS`].
pub fn find_browser(path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var).find_map(|dir| {
        SUPPORTED_BROWSERS
            .iter()
            .map(|name| dir.join(name))
            .find(|bin| bin.exists())
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchMode {
    /// App served by the dev server; devtools open, browser logs on stderr.
    Development,
    /// App loaded from its built `index.html`.
    Production { index_html: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub browser: PathBuf,
    pub bridge_dir: PathBuf,
    pub profile_dir: PathBuf,
    pub host_manifest: PathBuf,
    pub mode: LaunchMode,
}

impl LaunchPlan {
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--load-extension={}", self.bridge_dir.display()),
            format!("--user-data-dir={}", self.profile_dir.display()),
        ];
        match &self.mode {
            LaunchMode::Development => {
                args.push(format!("--app={DEV_SERVER_URL}"));
                args.push("--auto-open-devtools-for-tabs".into());
                args.push("--enable-logging=stderr".into());
            }
            LaunchMode::Production { index_html } => {
                args.push(format!("--app=file://{}", index_html.display()));
                args.push("--allow-file-access-from-files".into());
            }
        }
        args
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.browser);
        cmd.args(self.args());
        cmd
    }

    /// Development profiles drop the cached service worker so a rebuilt relay
    /// is picked up.
    pub fn prepare_profile(&self) -> Result<()> {
        if self.mode != LaunchMode::Development {
            return Ok(());
        }
        let cache = self.profile_dir.join("Default").join("Service Worker");
        match fs::remove_dir_all(&cache) {
            Ok(()) => {
                tracing::debug!(path = %cache.display(), "cleared service worker cache");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write both manifests for the app in `app_dir` and work out how to start the
/// browser.
///
/// Needs the `[app]` and `[host]` sections. The bridge extension is expected in
/// `app_dir/<app.bridge_dir>` (`bridge` unless configured, e.g. a
/// `host/node_modules/...` checkout in development), the built app in
/// `app_dir/app/dist/index.html`.
pub fn prepare_launch(
    cfg: &BridgeConfig,
    app_dir: &Path,
    development: bool,
    path_var: &OsStr,
) -> Result<LaunchPlan> {
    let app = cfg
        .app
        .as_ref()
        .ok_or_else(|| BridgeError::Config("missing [app] section".into()))?;
    let host = cfg
        .host
        .as_ref()
        .ok_or_else(|| BridgeError::Config("missing [host] section".into()))?;

    let browser = find_browser(path_var).ok_or_else(|| {
        BridgeError::Config("could not find a compatible Chromium-based browser".into())
    })?;
    let browser_name = browser
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let data_dir = paths::data_dir(&app.name, development)?;
    let profile_dir = paths::profile_dir(&data_dir, &browser_name);
    let host_manifest = paths::host_manifest_path(&profile_dir, &app.name);
    let bridge_dir = app_dir.join(&app.bridge_dir);
    let host_path = if host.program.is_absolute() {
        host.program.clone()
    } else {
        app_dir.join(&host.program)
    };

    tracing::info!(
        development,
        app = %app.name,
        browser = %browser.display(),
        data_dir = %data_dir.display(),
        "preparing launch"
    );

    manifest::write_bridge_manifest(
        &manifest::BridgeManifest::new(&app.name, &app.version),
        &bridge_dir,
    )?;

    let id = manifest::extension_id(&fs::canonicalize(&bridge_dir)?);
    let description = format!("{} Native Messaging Host", app.title);
    manifest::write_host_manifest(
        &manifest::HostManifest::new(&app.name, &description, &host_path, &id),
        &host_manifest,
    )?;

    #[cfg(all(windows, feature = "windows-registry"))]
    super::winreg::write_host_registry_key(&app.host_name(), &host_manifest)?;

    let mode = if development {
        LaunchMode::Development
    } else {
        LaunchMode::Production {
            index_html: app_dir.join("app").join("dist").join("index.html"),
        }
    };

    Ok(LaunchPlan {
        browser,
        bridge_dir,
        profile_dir,
        host_manifest,
        mode,
    })
}
