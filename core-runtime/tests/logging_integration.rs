//! Integration tests for logging system

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::log::{LogEntry, LogLevel, LoggerSink};
use core_runtime::logging::{init_logging, redact_if_sensitive, LogFormat, LoggingConfig};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingSink {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LoggerSink for RecordingSink {
    async fn log(&self, entry: LogEntry) -> BridgeResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

// A process can install only one global subscriber, so initialization and
// the double-init failure live in the same test.
#[test]
fn test_global_init_mirrors_to_sink_and_rejects_second_init() {
    let sink = Arc::new(RecordingSink::default());
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Info)
        .with_logger_sink(sink.clone());

    init_logging(config).expect("first init succeeds");

    tracing::warn!(target: "core_request", path = "questions/questions/", "request failed");
    tracing::debug!(target: "core_request", "filtered out by level");
    tracing::info!(target: "some_other_crate", "not enabled by the default filter");

    {
        let entries = sink.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Warn);
        assert_eq!(
            entries[0].fields.get("path"),
            Some(&"questions/questions/".to_string())
        );
    }

    assert!(init_logging(LoggingConfig::default()).is_err());
}

#[test]
fn test_invalid_custom_filter_is_rejected() {
    let config = LoggingConfig::default().with_filter("core_request=notalevel");
    assert!(init_logging(config).is_err());
}

#[test]
fn test_redaction_helpers() {
    assert_eq!(redact_if_sensitive("refresh", "abc"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("access_token", "abc"), "[REDACTED]");
    assert!(!redact_if_sensitive("email", "user@example.com").contains("example.com"));
    assert_eq!(redact_if_sensitive("question_id", "42"), "42");
}
