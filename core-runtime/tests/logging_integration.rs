//! Integration tests for logging setup.
//!
//! The subscriber can only be installed once per process, so the successful
//! and the already-initialized paths share one test.

use core_runtime::logging::{init_logging, strip_path, LogFormat, LogLevel, LoggingConfig};

#[test]
fn test_config_builder_composes() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Json)
        .with_level(LogLevel::Debug)
        .with_filter("core_reader=trace")
        .with_spans(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, LogLevel::Debug);
    assert_eq!(config.filter, Some("core_reader=trace".to_string()));
    assert!(!config.enable_spans);
    assert!(config.display_thread_info);
}

#[test]
fn test_invalid_filter_is_rejected_before_install() {
    // Fails in filter parsing, leaving the process subscriber untouched.
    let result = init_logging(LoggingConfig::default().with_filter("[not a directive"));
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Invalid log filter"));
}

#[test]
fn test_second_initialization_fails() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn);

    init_logging(config.clone()).unwrap();
    tracing::warn!("logging initialized for integration test");

    let err = init_logging(config).unwrap_err();
    assert!(err.to_string().contains("Failed to initialize logging"));
}

#[test]
fn test_strip_path_keeps_basename_only() {
    assert_eq!(
        strip_path("/home/user/.local/share/reader/ebook_bookshelf.json"),
        "ebook_bookshelf.json"
    );
    assert_eq!(
        strip_path("C:\\Users\\reader\\ebook_reader_settings.json"),
        "ebook_reader_settings.json"
    );
    assert_eq!(
        strip_path("ebook_search_history.json"),
        "ebook_search_history.json"
    );
}
