#![allow(clippy::unwrap_used)]
// Config file round-trips and loading through figment.

use std::time::Duration;

use pretty_assertions::assert_eq;

use cilia_config::{
    Config, Profile, find_profile, load_config_from, profile_to_device_config, save_config_to,
};
use cilia_core::RgbColor;

#[test]
fn test_missing_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(cfg.default_profile.as_deref(), Some("default"));
    assert_eq!(cfg.defaults.timeout, 10);
    assert_eq!(cfg.defaults.send_timeout, 5);
    assert!(cfg.profiles.is_empty());
}

#[test]
fn test_save_then_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = Config {
        default_profile: Some("rig".into()),
        ..Config::default()
    };
    cfg.profiles.insert(
        "rig".into(),
        Profile {
            host: "10.0.0.7".into(),
            port: 2000,
            name: "Racing".into(),
            scents: vec!["Pine".into(), "Leather".into()],
            groups: vec!["Left".into(), "Right".into()],
            lights: vec!["255000000".into(), "000255000010".into()],
            load_profile: Some(false),
            ..Profile::default()
        },
    );
    save_config_to(&cfg, &path).unwrap();

    let loaded = load_config_from(&path).unwrap();
    assert_eq!(loaded.default_profile.as_deref(), Some("rig"));

    let profile = find_profile(&loaded, "rig").unwrap();
    assert_eq!(profile.host, "10.0.0.7");
    assert_eq!(profile.port, 2000);
    assert_eq!(profile.scents, vec!["Pine", "Leather"]);
    assert_eq!(profile.groups, vec!["Left", "Right"]);
    assert_eq!(profile.load_profile, Some(false));
    assert_eq!(profile.auto_connect, None);
}

#[test]
fn test_hand_written_profile_is_sanitized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
default_profile = "desk"

[defaults]
timeout = 3

[profiles.desk]
host = "192.168.1.40"
name = "My Desk!"
scents = ["Fresh Pine", "", "Ocean-Breeze"]
groups = ["Front Left", "Front Right"]
lights = ["255128000"]
"#,
    )
    .unwrap();

    let cfg = load_config_from(&path).unwrap();
    let profile = find_profile(&cfg, "desk").unwrap();
    let device = profile_to_device_config(profile, &cfg.defaults).unwrap();

    assert_eq!(device.host, "192.168.1.40");
    assert_eq!(device.port, 1995);
    assert_eq!(device.connect_timeout, Some(Duration::from_secs(3)));
    assert_eq!(device.profile.name, "MyDesk");
    assert_eq!(
        device.profile.scents,
        vec!["FreshPine", "BahamaBreeze", "OceanBreeze"]
    );
    assert_eq!(device.profile.groups, vec!["FrontLeft", "FrontRight"]);
    assert_eq!(device.profile.lights, vec![RgbColor::new(255, 128, 0)]);
    assert_eq!(device.profile.group_id("FrontRight"), Some(1));
}

#[test]
fn test_unknown_profile_is_reported() {
    let cfg = Config::default();
    let err = find_profile(&cfg, "nope").unwrap_err();
    assert_eq!(err.to_string(), "profile 'nope' not found in config");
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[profiles.bad]\nport = \"not a number\"\n").unwrap();

    assert!(load_config_from(&path).is_err());
}
