use native_bridge::{
    bus::DEFAULT_CASCADE_LIMIT,
    config::{load_from_file, load_from_str},
    framing::MAX_FROM_BROWSER,
    BridgeError,
};

const FULL: &str = r#"
[bridge]
extension_name = "acme_bridge"
cascade_limit = 16

[host]
program = "/opt/acme/acme-host"
args = ["--verbose"]

[app]
name = "acme"
title = "Acme"
version = "1.2.3"
"#;

#[test]
fn full_config_parses_with_defaults_filled() {
    let cfg = load_from_str(FULL).unwrap();
    assert_eq!(cfg.native_host_id(), "acme_host");
    assert_eq!(cfg.bridge.cascade_limit, 16);

    let host = cfg.host.as_ref().unwrap();
    assert_eq!(host.args, vec!["--verbose"]);
    assert_eq!(host.max_message_bytes, MAX_FROM_BROWSER);

    let app = cfg.app.as_ref().unwrap();
    assert_eq!(app.extension_name(), "acme_bridge");
    assert_eq!(app.host_name(), "acme_host");
    assert_eq!(app.bridge_dir, std::path::PathBuf::from("bridge"));
}

#[test]
fn minimal_config_only_needs_extension_name() {
    let cfg = load_from_str("[bridge]\nextension_name = \"x_bridge\"\n").unwrap();
    assert_eq!(cfg.bridge.cascade_limit, DEFAULT_CASCADE_LIMIT);
    assert!(cfg.host.is_none());
    assert!(cfg.app.is_none());
}

#[test]
fn rejects_invalid_values() {
    for bad in [
        "[bridge]\nextension_name = \"  \"\n",
        "[bridge]\nextension_name = \"a\"\ncascade_limit = 0\n",
        "[bridge]\nextension_name = \"a\"\n[host]\nprogram = \"/x\"\nmax_message_bytes = 0\n",
        "[bridge]\nextension_name = \"a\"\n[host]\nprogram = \"/x\"\nmax_message_bytes = 999999999999\n",
        "[bridge]\nextension_name = \"a\"\n[app]\nname = \"\"\ntitle = \"t\"\nversion = \"1\"\n",
        "[bridge]\nextension_name = \"a\"\n[app]\nname = \"n\"\ntitle = \"t\"\nversion = \"1\"\nbridge_dir = \"\"\n",
    ] {
        let err = load_from_str(bad).expect_err(bad);
        assert!(matches!(err, BridgeError::Config(_)), "{bad}: {err}");
    }
}

#[test]
fn rejects_unknown_fields_and_bad_toml() {
    assert!(load_from_str("[bridge]\nextension_name = \"a\"\nreconnect_ms = 5\n").is_err());
    assert!(load_from_str("[bridge\n").is_err());
    assert!(load_from_str("").is_err());
}

#[test]
fn loads_from_file() {
    let td = tempfile::tempdir().unwrap();
    let path = td.path().join("bridge.toml");
    std::fs::write(&path, FULL).unwrap();
    assert_eq!(load_from_file(&path).unwrap().native_host_id(), "acme_host");

    let missing = load_from_file(td.path().join("nope.toml")).expect_err("missing file");
    assert!(matches!(missing, BridgeError::Config(_)));
}
