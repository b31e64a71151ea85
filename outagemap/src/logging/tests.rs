use crate::config::{LogFormat, LogLevel, LoggingConfig};
use crate::logging::{build_filter, level_to_log_level, parse_log_level};
use std::sync::Once;

// Use this to ensure init is only called once across all tests
static INIT: Once = Once::new();

#[test]
fn test_init_console_logging() {
    INIT.call_once(|| {
        let config = LoggingConfig {
            level: LogLevel::Debug,
            format: LogFormat::Compact,
            file: None,
            stdout: true,
        };

        assert!(crate::logging::init(&config).is_ok());
    });
}

#[test]
fn test_second_init_is_tolerated() {
    let config = LoggingConfig::default();
    let _ = crate::logging::init(&config);
    assert!(crate::logging::init(&config).is_ok());
}

#[test]
fn test_level_conversion() {
    assert!(parse_log_level("trace").is_ok());
    assert!(parse_log_level("DEBUG").is_ok());
    assert!(parse_log_level("warn").is_ok());
    assert!(parse_log_level("invalid").is_err());

    assert_eq!(level_to_log_level(tracing::Level::INFO), LogLevel::Info);
    assert_eq!(level_to_log_level(tracing::Level::ERROR), LogLevel::Error);
}

#[test]
fn test_filter_quiets_storage_crates() {
    let filter = build_filter(&LogLevel::Debug).to_string();
    assert!(filter.contains("surrealdb=warn"));
}
