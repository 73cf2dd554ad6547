//! Integration tests for configuration handling.

use std::collections::HashMap;
use std::time::Duration;

use rust_duplex::config::env::{EnvConfig, vars};
use rust_duplex::config::file::{ConfigFormat, ConfigLoader, parse_config};
use rust_duplex::{DuplexConfig, LineEnding, MatchMode};

fn temp_config(name: &str, content: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("rust-duplex-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn load_toml_file() {
    let path = temp_config(
        "modem.toml",
        r#"
        queue_capacity = 3
        buffer_capacity = 256
        max_command_len = 64
        default_timeout_ms = 1000
        line_ending = "cr"
        "#,
    );
    let config = rust_duplex::config::file::load(&path).unwrap();
    assert_eq!(config.queue_capacity, 3);
    assert_eq!(config.buffer_capacity, 256);
    assert_eq!(config.max_command_len, 64);
    assert_eq!(config.default_timeout, Duration::from_millis(1000));
    assert_eq!(config.line_ending, LineEnding::Cr);
    assert_eq!(config.hook_capacity, DuplexConfig::default().hook_capacity);
}

#[test]
fn load_json_by_name() {
    let path = temp_config(
        "sensor.json",
        r#"{ "match_mode": "line_terminated", "ignore_nul": false }"#,
    );
    let dir = path.parent().unwrap();
    let config = ConfigLoader::new().add_path(dir).load_by_name("sensor").unwrap();
    assert_eq!(config.match_mode, MatchMode::LineTerminated);
    assert!(!config.ignore_nul);
}

#[test]
fn missing_file_reports_path() {
    let err = rust_duplex::config::file::load("/nonexistent/duplex.toml").unwrap_err();
    assert!(err.is_io());
    assert!(err.to_string().contains("/nonexistent/duplex.toml"));
}

#[test]
fn invalid_values_rejected() {
    let err = parse_config("queue_capacity = 0", ConfigFormat::Toml).unwrap_err();
    assert!(err.to_string().contains("queue_capacity"));

    let err = parse_config(r#"{ "line_ending": "nel" }"#, ConfigFormat::Json).unwrap_err();
    assert!(matches!(err, rust_duplex::DuplexError::Config { .. }));
}

#[test]
fn env_overrides_apply_on_top() {
    let vars: HashMap<String, String> = [
        (format!("MODEM_{}", vars::QUEUE_CAPACITY), "4".to_string()),
        (format!("MODEM_{}", vars::DEFAULT_TIMEOUT_MS), "750".to_string()),
        (format!("MODEM_{}", vars::CLEAR_ON_SEND), "yes".to_string()),
        (format!("MODEM_{}", vars::LINE_ENDING), "LF".to_string()),
    ]
    .into_iter()
    .collect();

    let base = DuplexConfig::new().buffer_capacity(64);
    let config = EnvConfig::from_map("MODEM", vars).apply(base).unwrap();
    assert_eq!(config.queue_capacity, 4);
    assert_eq!(config.default_timeout, Duration::from_millis(750));
    assert!(config.clear_on_send);
    assert_eq!(config.line_ending, LineEnding::Lf);
    assert_eq!(config.buffer_capacity, 64);
}

#[test]
fn env_bad_number_rejected() {
    let vars: HashMap<String, String> =
        [("DUPLEX_QUEUE_CAPACITY".to_string(), "many".to_string())]
            .into_iter()
            .collect();
    let err = EnvConfig::from_map("DUPLEX", vars)
        .apply(DuplexConfig::default())
        .unwrap_err();
    assert!(err.to_string().contains("DUPLEX_QUEUE_CAPACITY"));
}

#[cfg(feature = "mock")]
#[test]
fn builder_loads_config_file() {
    use rust_duplex::{DuplexBuilder, MockChannel};

    let path = temp_config("builder.toml", "queue_capacity = 2\nhook_capacity = 1\n");
    let duplex = DuplexBuilder::new()
        .config_file(&path)
        .unwrap()
        .begin(MockChannel::new())
        .unwrap();
    assert_eq!(duplex.queue_capacity(), 2);
    assert_eq!(duplex.config().hook_capacity, 1);
}

#[cfg(feature = "mock")]
#[test]
fn env_line_ending_reaches_channel_built_from_config() {
    use rust_duplex::{Command, DuplexBuilder, MockChannel, Timing};

    let vars: HashMap<String, String> = [(format!("MODEM_{}", vars::LINE_ENDING), "CR".to_string())]
        .into_iter()
        .collect();
    let config = EnvConfig::from_map("MODEM", vars)
        .apply(DuplexConfig::default())
        .unwrap();

    let modem = MockChannel::from_config(&config);
    let mut duplex = DuplexBuilder::new()
        .config(config)
        .begin(modem.clone())
        .unwrap();
    duplex.enqueue(Command::new("ATI", "OK"), Timing::Tail).unwrap();
    duplex.poll().unwrap();
    assert_eq!(modem.take_output_str(), "ATI\r");
}
