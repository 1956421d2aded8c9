//! Everything the launcher does before the browser starts: write the bridge
//! extension manifest and the native host manifest, then build the browser
//! command line.

pub mod launcher;
pub mod manifest;
pub mod paths;

#[cfg(all(windows, feature = "windows-registry"))]
pub mod winreg;

pub use launcher::{find_browser, prepare_launch, LaunchMode, LaunchPlan};
pub use manifest::{extension_id, BridgeManifest, HostManifest};
