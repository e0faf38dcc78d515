//! Loading configuration files from disk

use std::fs;

use dulynoted_domain::config::{RedirectKind, TransportKind};
use dulynoted_domain::{DulyNotedError, Provider, TransportStrategy};
use dulynoted_infra::config;
use tempfile::TempDir;

#[test]
fn toml_file_with_partial_sections() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dulynoted.toml");
    fs::write(
        &path,
        r#"
[oauth]
proxy_url = "https://proxy.example.test/"

[oauth.github]
client_id = "Iv1.abc"

[oauth.notion]
transport = "direct_basic_auth"
client_secret = "notion-secret"

[cache]
ttl_seconds = 600

[callback]
port = 9100
"#,
    )
    .unwrap();

    let config = config::load_from_file(Some(path)).unwrap().with_provider_defaults();

    assert_eq!(config.oauth.github.client_id, "Iv1.abc");
    assert_eq!(config.oauth.github.redirect_kind(), RedirectKind::CallbackPage);
    assert!(!config.oauth.github.scopes.is_empty());
    assert_eq!(
        config.transport_strategy(Provider::GitHub).unwrap(),
        TransportStrategy::ProxiedJson { proxy_base: "https://proxy.example.test".into() }
    );

    assert_eq!(config.oauth.notion.transport, TransportKind::DirectBasicAuth);
    assert_eq!(config.oauth.notion.redirect_kind(), RedirectKind::Identity);
    assert!(matches!(
        config.transport_strategy(Provider::Notion).unwrap(),
        TransportStrategy::DirectBasicAuth { .. }
    ));

    assert_eq!(config.cache.ttl_seconds, 600);
    assert_eq!(config.callback.port, 9100);
    assert_eq!(config.callback.path, "/oauth/callback");
}

#[test]
fn json_file_is_accepted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "storage": { "path": "/tmp/dulynoted-test.db" },
            "cache": { "recently_used_capacity": 3 }
        }"#,
    )
    .unwrap();

    let config = config::load_from_file(Some(path)).unwrap();

    assert_eq!(config.storage.path.as_deref(), Some("/tmp/dulynoted-test.db"));
    assert_eq!(config.cache.recently_used_capacity, 3);
    assert_eq!(config.cache.ttl_seconds, 86_400);
}

#[test]
fn missing_file_is_a_configuration_error() {
    let dir = TempDir::new().unwrap();
    let err = config::load_from_file(Some(dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, DulyNotedError::Configuration(msg) if msg.contains("not found")));
}

#[test]
fn malformed_files_are_rejected() {
    let dir = TempDir::new().unwrap();

    let toml_path = dir.path().join("broken.toml");
    fs::write(&toml_path, "[oauth\nproxy_url = ").unwrap();
    let err = config::load_from_file(Some(toml_path)).unwrap_err();
    assert!(matches!(err, DulyNotedError::Configuration(msg) if msg.contains("TOML")));

    let json_path = dir.path().join("broken.json");
    fs::write(&json_path, "{ \"cache\": ").unwrap();
    let err = config::load_from_file(Some(json_path)).unwrap_err();
    assert!(matches!(err, DulyNotedError::Configuration(msg) if msg.contains("JSON")));

    let yaml_path = dir.path().join("config.yaml");
    fs::write(&yaml_path, "cache: {}").unwrap();
    let err = config::load_from_file(Some(yaml_path)).unwrap_err();
    assert!(matches!(err, DulyNotedError::Configuration(msg) if msg.contains("yaml")));
}
