//! Tests for the logger module as a whole

use std::fs;
use std::path::Path;

use proptest::prelude::*;
use tempfile::tempdir;
use tracing_subscriber::{Registry, layer::SubscriberExt};

use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig, RotationConfig, build_layers};

fn file_only(path: &Path, format: LogFormat) -> LoggerConfig {
    LoggerConfig {
        console: ConsoleConfig {
            enabled: false,
            colored: false,
        },
        file: FileConfig {
            enabled: true,
            path: path.to_path_buf(),
            append: true,
            format,
            rotation: RotationConfig::default(),
        },
        level: "info".to_string(),
    }
}

/// Run `f` with the configured layers installed as the thread-local default
fn with_layers(config: &LoggerConfig, f: impl FnOnce()) {
    let layers = build_layers(config).expect("layers should build");
    let subscriber = Registry::default()
        .with(layers)
        .with(config.env_filter().expect("filter should parse"));
    tracing::subscriber::with_default(subscriber, f);
}

#[test]
fn test_layer_count_follows_enabled_outputs() {
    let dir = tempdir().unwrap();
    let mut config = file_only(&dir.path().join("app.log"), LogFormat::Full);

    assert_eq!(build_layers(&config).unwrap().len(), 1);

    config.console.enabled = true;
    assert_eq!(build_layers(&config).unwrap().len(), 2);

    config.file.enabled = false;
    assert_eq!(build_layers(&config).unwrap().len(), 1);
}

#[test]
fn test_json_file_output() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");

    with_layers(&file_only(&path, LogFormat::Json), || {
        tracing::info!(success_count = 2, failure_count = 0, "Multicast finished");
    });

    let content = fs::read_to_string(&path).unwrap();
    let line: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
    assert_eq!(line["level"], "INFO");
    assert_eq!(line["fields"]["message"], "Multicast finished");
    assert_eq!(line["fields"]["success_count"], 2);
}

#[test]
fn test_file_output_has_no_ansi_codes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let mut config = file_only(&path, LogFormat::Full);
    config.console.enabled = true;
    config.console.colored = true;

    with_layers(&config, || {
        let span = tracing::info_span!("dispatch", tokens = 3);
        let _entered = span.enter();
        tracing::warn!("Token rejected");
    });

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("Token rejected"));
    assert!(!content.contains('\u{1b}'));
}

#[test]
fn test_level_filters_file_output() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app.log");
    let config = file_only(&path, LogFormat::Compact).with_level("warn");

    with_layers(&config, || {
        tracing::info!("hidden");
        tracing::error!("visible");
    });

    let content = fs::read_to_string(&path).unwrap();
    assert!(!content.contains("hidden"));
    assert!(content.contains("visible"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_valid_configs_validate(
        console_enabled in any::<bool>(),
        file_enabled in any::<bool>(),
        colored in any::<bool>(),
        append in any::<bool>(),
        max_size in 1u64..1_000_000u64,
        max_files in 1usize..100usize,
        level in prop_oneof![Just("trace"), Just("debug"), Just("info"), Just("warn"), Just("error")],
    ) {
        prop_assume!(console_enabled || file_enabled);

        let config = LoggerConfig {
            console: ConsoleConfig { enabled: console_enabled, colored },
            file: FileConfig {
                enabled: file_enabled,
                path: "logs/test.log".into(),
                append,
                format: LogFormat::Json,
                rotation: RotationConfig { max_size, max_files },
            },
            level: level.to_string(),
        };

        prop_assert!(config.validate().is_ok());
    }
}
