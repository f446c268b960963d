//! Tests for router configuration.

use rudder_core::{LocalKind, RouterConfig, ServiceMode};
use std::io::Write;

#[test]
fn defaults_are_hybrid_ollama() {
    let config = RouterConfig::default();
    assert_eq!(config.mode, ServiceMode::Hybrid);
    assert_eq!(config.local_kind, LocalKind::Ollama);
    assert_eq!(config.local_url, "http://localhost:11434");
    assert_eq!(config.cloud_provider.as_str(), "huggingface");
    assert_eq!(config.poll_failure_budget, 5);
}

#[test]
fn parse_full_config() {
    let config: RouterConfig = toml::from_str(
        r#"
        mode = "local"
        local_url = "http://10.0.0.5:8000"
        local_kind = "generic"
        cloud_provider = "deepseek-chat"
        poll_failure_budget = 3

        [limits]
        "huggingface" = 2048
        "#,
    )
    .unwrap();
    assert_eq!(config.mode, ServiceMode::Local);
    assert_eq!(config.local_kind, LocalKind::Generic);
    assert_eq!(config.local_url, "http://10.0.0.5:8000");
    assert_eq!(config.limits.limit_for("huggingface"), 2_048);
    assert_eq!(config.poll_failure_budget, 3);
}

#[test]
fn missing_fields_use_defaults() {
    let config: RouterConfig = toml::from_str("mode = \"cloud\"").unwrap();
    assert_eq!(config.mode, ServiceMode::Cloud);
    assert_eq!(config.local_kind, LocalKind::Ollama);
}

#[test]
fn load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "mode = \"hybrid\"\nlocal_kind = \"generic\"").unwrap();
    let config = RouterConfig::load(file.path()).unwrap();
    assert_eq!(config.mode, ServiceMode::Hybrid);
    assert_eq!(config.local_kind, LocalKind::Generic);
}

#[test]
fn load_missing_file_errors() {
    assert!(RouterConfig::load("/nonexistent/rudder.toml").is_err());
}

#[test]
fn mode_serde_round_trip() {
    for mode in [ServiceMode::Local, ServiceMode::Cloud, ServiceMode::Hybrid] {
        let raw = serde_json::to_string(&mode).unwrap();
        let back: ServiceMode = serde_json::from_str(&raw).unwrap();
        assert_eq!(mode, back);
    }
}
