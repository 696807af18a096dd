use super::settings::Settings;
use super::{load_config, load_config_from};
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 8765);
    assert_eq!(settings.http.port, 0);
    assert_eq!(settings.zenoh.mode, "peer");
    assert_eq!(settings.zenoh.key_expr, "**");
    assert_eq!(settings.bridge.position_topic, "vehicle/position");
    assert_eq!(settings.bridge.ignored_topics, vec!["rosout/**".to_string()]);
    assert!(settings.bridge.schema_exclusions.is_empty());
    assert_eq!(settings.logging.level, "info");
}

#[test]
#[serial]
fn missing_default_file_yields_defaults() {
    temp_env::with_vars_unset(
        ["FOXBRIDGE_SERVER__PORT", "FOXBRIDGE_BRIDGE__IGNORED_TOPICS"],
        || {
            let cfg = load_config().expect("load_config failed");
            assert_eq!(cfg, Settings::default());
        },
    );
}

#[test]
#[serial]
fn load_config_from_file_overrides_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("bridge.toml");
    let toml = r#"
        [server]
        port = 9000

        [zenoh]
        mode = "client"
        connect = ["tcp/10.0.0.1:7447"]

        [bridge]
        ignored_topics = ["noisy/**", "heartbeat"]
        schema_exclusions = ["telemetry/stats"]
    "#;
    fs::write(&path, toml).expect("write config file");

    let cfg = load_config_from(path.to_str()).expect("load_config failed");
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.zenoh.mode, "client");
    assert_eq!(cfg.zenoh.connect, vec!["tcp/10.0.0.1:7447".to_string()]);
    assert_eq!(
        cfg.bridge.ignored_topics,
        vec!["noisy/**".to_string(), "heartbeat".to_string()]
    );
    assert_eq!(cfg.bridge.schema_exclusions, vec!["telemetry/stats".to_string()]);
    assert_eq!(cfg.bridge.position_topic, "vehicle/position");
}

#[test]
#[serial]
fn missing_explicit_file_is_an_error() {
    let tmp = TempDir::new().expect("create tempdir");
    let path = tmp.path().join("absent.toml");
    assert!(load_config_from(path.to_str()).is_err());
}

#[test]
#[serial]
fn environment_overrides_defaults() {
    temp_env::with_vars(
        [
            ("FOXBRIDGE_SERVER__PORT", Some("9100")),
            ("FOXBRIDGE_BRIDGE__IGNORED_TOPICS", Some("a/**,b")),
            ("FOXBRIDGE_LOGGING__LEVEL", Some("debug")),
        ],
        || {
            let cfg = load_config().expect("load_config failed");
            assert_eq!(cfg.server.port, 9100);
            assert_eq!(
                cfg.bridge.ignored_topics,
                vec!["a/**".to_string(), "b".to_string()]
            );
            assert_eq!(cfg.logging.level, "debug");
        },
    );
}
