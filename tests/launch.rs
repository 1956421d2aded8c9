#![cfg(all(feature = "install", unix))]

mod common;

use native_bridge::{
    config::load_from_str,
    install::{find_browser, launcher::LaunchPlan, manifest::extension_id, prepare_launch, LaunchMode},
};
use serial_test::serial;
use std::{ffi::OsString, fs, path::Path};

fn fake_browser(dir: &Path, name: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(name), b"#!/bin/sh\nexit 0\n").unwrap();
}

fn path_var(dirs: &[&Path]) -> OsString {
    std::env::join_paths(dirs).unwrap()
}

const CFG: &str = r#"
[bridge]
extension_name = "acme_bridge"

[host]
program = "host/acme-host"

[app]
name = "acme"
title = "Acme"
version = "0.3.0"
"#;

#[test]
fn find_browser_takes_first_path_entry_with_a_match() {
    let td = tempfile::tempdir().unwrap();
    let empty = td.path().join("empty");
    let a = td.path().join("a");
    let b = td.path().join("b");
    fs::create_dir_all(&empty).unwrap();
    fake_browser(&a, "vivaldi");
    fake_browser(&b, "chromium-browser");

    let found = find_browser(&path_var(&[&empty, &a, &b])).unwrap();
    assert_eq!(found, a.join("vivaldi"));
    assert!(find_browser(&path_var(&[&empty])).is_none());
}

#[test]
#[serial]
fn prepare_launch_writes_manifests_into_profile() {
    let (td, _env) = common::sandbox_env();
    let app_dir = td.path().join("app_root");
    fs::create_dir_all(app_dir.join("bridge")).unwrap();
    let bin = td.path().join("bin");
    fake_browser(&bin, "google-chrome");

    let cfg = load_from_str(CFG).unwrap();
    let plan = prepare_launch(&cfg, &app_dir, false, &path_var(&[&bin])).unwrap();

    let profile = td.path().join("home/.config/acme/google-chrome");
    assert_eq!(plan.browser, bin.join("google-chrome"));
    assert_eq!(plan.profile_dir, profile);
    assert_eq!(
        plan.host_manifest,
        profile.join("NativeMessagingHosts/acme_host.json")
    );
    assert_eq!(
        plan.mode,
        LaunchMode::Production {
            index_html: app_dir.join("app/dist/index.html")
        }
    );

    let bridge: serde_json::Value =
        serde_json::from_slice(&fs::read(app_dir.join("bridge/manifest.json")).unwrap()).unwrap();
    assert_eq!(bridge["name"], "acme_bridge");
    assert_eq!(bridge["version"], "0.3.0");

    let host: serde_json::Value =
        serde_json::from_slice(&fs::read(&plan.host_manifest).unwrap()).unwrap();
    let id = extension_id(&fs::canonicalize(app_dir.join("bridge")).unwrap());
    assert_eq!(host["name"], "acme_host");
    assert_eq!(host["description"], "Acme Native Messaging Host");
    assert_eq!(host["path"], app_dir.join("host/acme-host").to_str().unwrap());
    assert_eq!(host["allowed_origins"][0], format!("chrome-extension://{id}/"));
}

#[test]
#[serial]
fn development_uses_separate_data_dir_and_dev_server() {
    let (td, _env) = common::sandbox_env();
    let app_dir = td.path().join("app_root");
    fs::create_dir_all(app_dir.join("bridge")).unwrap();
    let bin = td.path().join("bin");
    fake_browser(&bin, "chromium-browser");

    let cfg = load_from_str(CFG).unwrap();
    let plan = prepare_launch(&cfg, &app_dir, true, &path_var(&[&bin])).unwrap();
    assert_eq!(
        plan.profile_dir,
        td.path().join("home/.config/acme/development/chromium-browser")
    );

    let args = plan.args();
    assert!(args.contains(&"--app=http://localhost:3000".to_string()));
    assert!(args.contains(&"--auto-open-devtools-for-tabs".to_string()));
    assert!(args.contains(&format!("--load-extension={}", app_dir.join("bridge").display())));
    assert!(!args.iter().any(|a| a == "--allow-file-access-from-files"));

    // Stale service worker cache is removed; a missing one is fine.
    let cache = plan.profile_dir.join("Default/Service Worker");
    fs::create_dir_all(cache.join("CacheStorage")).unwrap();
    plan.prepare_profile().unwrap();
    assert!(!cache.exists());
    plan.prepare_profile().unwrap();
}

#[test]
fn production_args_load_built_index() {
    let plan = LaunchPlan {
        browser: "/usr/bin/google-chrome".into(),
        bridge_dir: "/opt/acme/bridge".into(),
        profile_dir: "/home/me/.config/acme/google-chrome".into(),
        host_manifest: "/home/me/.config/acme/google-chrome/NativeMessagingHosts/acme_host.json"
            .into(),
        mode: LaunchMode::Production {
            index_html: "/opt/acme/app/dist/index.html".into(),
        },
    };
    assert_eq!(
        plan.args(),
        vec![
            "--load-extension=/opt/acme/bridge",
            "--user-data-dir=/home/me/.config/acme/google-chrome",
            "--app=file:///opt/acme/app/dist/index.html",
            "--allow-file-access-from-files",
        ]
    );
    assert_eq!(plan.command().get_program(), "/usr/bin/google-chrome");
    // Production never touches the profile.
    plan.prepare_profile().unwrap();
}

#[test]
#[serial]
fn prepare_launch_requires_app_and_host_sections() {
    let (td, _env) = common::sandbox_env();
    let cfg = load_from_str("[bridge]\nextension_name = \"acme_bridge\"\n").unwrap();
    let err = prepare_launch(&cfg, td.path(), false, &path_var(&[td.path()])).unwrap_err();
    assert!(matches!(err, native_bridge::BridgeError::Config(_)));
}

#[test]
#[serial]
fn configured_bridge_dir_is_loaded_and_hashed() {
    let (td, _env) = common::sandbox_env();
    let app_dir = td.path().join("app_root");
    let bridge_dir = app_dir.join("host/node_modules/@acme/bridge");
    fs::create_dir_all(&bridge_dir).unwrap();
    let bin = td.path().join("bin");
    fake_browser(&bin, "google-chrome");

    let cfg = load_from_str(&format!(
        "{CFG}bridge_dir = \"host/node_modules/@acme/bridge\"\n"
    ))
    .unwrap();
    let plan = prepare_launch(&cfg, &app_dir, true, &path_var(&[&bin])).unwrap();

    assert_eq!(plan.bridge_dir, bridge_dir);
    assert!(bridge_dir.join("manifest.json").exists());
    assert!(!app_dir.join("bridge").exists());
    assert!(plan
        .args()
        .contains(&format!("--load-extension={}", bridge_dir.display())));

    let host: serde_json::Value =
        serde_json::from_slice(&fs::read(&plan.host_manifest).unwrap()).unwrap();
    let id = extension_id(&fs::canonicalize(&bridge_dir).unwrap());
    assert_eq!(host["allowed_origins"][0], format!("chrome-extension://{id}/"));
}
