//! Logging setup
//!
//! Installs a global `tracing` subscriber from [`LoggingConfig`]. `RUST_LOG`
//! wins over the configured level when set.

use crate::config::LoggingConfig;
use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Unknown log format: {0} (expected \"pretty\" or \"json\")")]
    UnknownFormat(String),

    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Install the global subscriber
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let json = match config.format.as_str() {
        "json" => true,
        "pretty" => false,
        other => return Err(LoggingError::UnknownFormat(other.to_string())),
    };

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!("echo_patterns={}", config.level))
            .map_err(|e| LoggingError::InvalidFilter(e.to_string()))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer(json, std::io::stdout))
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}

/// Formatting layer for the configured output format
fn fmt_layer<S, W>(json: bool, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if json {
        Box::new(fmt::layer().json().with_writer(writer))
    } else {
        Box::new(fmt::layer().pretty().with_writer(writer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_unknown_format_rejected() {
        let config = LoggingConfig {
            level: "info".to_string(),
            format: "xml".to_string(),
        };
        assert!(matches!(init(&config), Err(LoggingError::UnknownFormat(_))));
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn render(json: bool) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber =
            tracing_subscriber::registry().with(fmt_layer(json, move || writer.clone()));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(answer = 42, "formatted event");
        });
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_pretty_format_is_multiline_with_location() {
        let output = render(false);
        assert!(output.contains("formatted event"));
        assert!(output.contains("src/logging.rs"));
        assert!(output.lines().count() >= 2);
    }

    #[test]
    fn test_json_format_emits_objects() {
        let output = render(true);
        let line = output.lines().next().unwrap();
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["fields"]["answer"], 42);
        assert_eq!(value["fields"]["message"], "formatted event");
    }

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig::default();
        let _ = init(&config);
        assert!(matches!(
            init(&config),
            Err(LoggingError::AlreadyInitialized(_))
        ));
    }
}
