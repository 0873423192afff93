use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use super::settings::{PartialBrokerSettings, PartialSettings, Settings};
use super::{BROKER_URI_ENV, load_config_from};
use crate::utils::error::ConfigError;

fn missing_file(tmp: &TempDir) -> String {
    tmp.path().join("absent").to_string_lossy().into_owned()
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 80);
    assert_eq!(settings.broker.uri, "ws://127.0.0.1:8080");
    assert_eq!(settings.broker.connect_attempts, 5);
    assert_eq!(settings.broker.retry_delay_ms, 1000);
    assert!(settings.broker.credentials().is_none());
    assert_eq!(settings.http.body_limit_bytes, 1024 * 1024);
}

#[test]
fn test_merge_keeps_defaults_for_missing_values() {
    let partial = PartialSettings {
        broker: Some(PartialBrokerSettings {
            connect_attempts: Some(2),
            ..Default::default()
        }),
        ..Default::default()
    };
    let settings = Settings::merge(partial);
    assert_eq!(settings.broker.connect_attempts, 2);
    assert_eq!(settings.broker.retry_delay_ms, 1000);
    assert_eq!(settings.server, Settings::default().server);
}

#[test]
fn test_credentials_require_both_halves() {
    let mut settings = Settings::default();
    settings.broker.username = Some("admin".to_string());
    assert!(settings.broker.credentials().is_none());
    settings.broker.password = Some("password".to_string());
    assert_eq!(settings.broker.credentials(), Some(("admin", "password")));
}

#[test]
#[serial]
fn load_config_without_sources_uses_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    temp_env::with_var_unset(BROKER_URI_ENV, || {
        let cfg = load_config_from(&missing_file(&tmp)).expect("load_config failed");
        assert_eq!(cfg, Settings::default());
    });
}

#[test]
#[serial]
fn load_config_from_file_overrides_defaults() {
    let tmp = TempDir::new().expect("create tempdir");
    let toml = r#"
        [server]
        host = "127.0.0.1"
        port = 9000

        [broker]
        uri = "ws://bus:7000"
        retry_delay_ms = 50
        username = "admin"
        password = "password"

        [http]
        body_limit_bytes = 2048
    "#;
    fs::write(tmp.path().join("default.toml"), toml).expect("write config file");
    let base = tmp.path().join("default").to_string_lossy().into_owned();

    temp_env::with_var_unset(BROKER_URI_ENV, || {
        let cfg = load_config_from(&base).expect("load_config failed");
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.broker.uri, "ws://bus:7000");
        assert_eq!(cfg.broker.retry_delay_ms, 50);
        assert_eq!(cfg.broker.connect_attempts, 5);
        assert_eq!(cfg.broker.credentials(), Some(("admin", "password")));
        assert_eq!(cfg.http.body_limit_bytes, 2048);
    });
}

#[test]
#[serial]
fn broker_uri_env_wins_over_file() {
    let tmp = TempDir::new().expect("create tempdir");
    fs::write(
        tmp.path().join("default.toml"),
        "[broker]\nuri = \"ws://from-file:1\"\n",
    )
    .expect("write config file");
    let base = tmp.path().join("default").to_string_lossy().into_owned();

    temp_env::with_var(BROKER_URI_ENV, Some("ws://from-env:2"), || {
        let cfg = load_config_from(&base).expect("load_config failed");
        assert_eq!(cfg.broker.uri, "ws://from-env:2");
    });
}

#[test]
#[serial]
fn blank_broker_uri_env_is_ignored() {
    let tmp = TempDir::new().expect("create tempdir");
    temp_env::with_var(BROKER_URI_ENV, Some("   "), || {
        let cfg = load_config_from(&missing_file(&tmp)).expect("load_config failed");
        assert_eq!(cfg.broker.uri, "ws://127.0.0.1:8080");
    });
}

#[test]
#[serial]
fn prefixed_env_sets_nested_values() {
    let tmp = TempDir::new().expect("create tempdir");
    temp_env::with_vars(
        [
            ("APP_SERVER__PORT", Some("8081")),
            ("APP_BROKER__CONNECT_ATTEMPTS", Some("3")),
            (BROKER_URI_ENV, None),
        ],
        || {
            let cfg = load_config_from(&missing_file(&tmp)).expect("load_config failed");
            assert_eq!(cfg.server.port, 8081);
            assert_eq!(cfg.broker.connect_attempts, 3);
        },
    );
}

#[test]
#[serial]
fn non_websocket_broker_uri_is_rejected() {
    let tmp = TempDir::new().expect("create tempdir");
    temp_env::with_var(BROKER_URI_ENV, Some("nats://127.0.0.1:4222"), || {
        let err = load_config_from(&missing_file(&tmp)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    });
}
