//! Logging configuration and progress reporting

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::domain::errors::DomainError;
use crate::engine::EngineProgress;
use crate::ports::LogLevel;

/// Logging configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level, overridden by `RUST_LOG` when set
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
    /// Include target module information
    pub target: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    Pretty,
    /// Compact text format
    Compact,
    /// JSON format for structured logging
    Json,
}

impl LogFormat {
    pub fn parse(format_str: &str) -> Result<Self, DomainError> {
        match format_str.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(DomainError::Configuration(format!(
                "Invalid log format: {}. Valid formats: pretty, compact, json",
                format_str
            ))),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            target: false,
        }
    }
}

/// Install the global tracing subscriber. Later calls are no-ops.
pub fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_filter()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(config.target)
        .with_writer(std::io::stderr);

    let _ = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };

    tracing::debug!(
        level = ?config.level,
        format = ?config.format,
        "Logging initialized"
    );
}

/// Logs engine progress for a long-running render, throttled to whole-percent steps
pub struct ProgressReporter {
    operation: String,
    start_time: Instant,
    last_percent: Option<u32>,
}

impl ProgressReporter {
    pub fn new(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        tracing::info!("Starting: {}", operation);
        Self {
            operation,
            start_time: Instant::now(),
            last_percent: None,
        }
    }

    /// Report one engine progress notification
    pub fn update(&mut self, progress: &EngineProgress) {
        let percent = (progress.ratio.clamp(0.0, 1.0) * 100.0).floor() as u32;
        if self.last_percent.is_some_and(|last| last >= percent) {
            return;
        }
        self.last_percent = Some(percent);

        let mut message = format!("[{:>3}%] {} at {:.2}s", percent, self.operation, progress.time);
        if progress.ratio > 0.0 {
            let elapsed = self.start_time.elapsed().as_secs_f64();
            let eta = elapsed / progress.ratio - elapsed;
            if eta > 0.0 {
                message.push_str(&format!(" (ETA: {:.0}s)", eta));
            }
        }
        tracing::info!("{}", message);
    }

    /// Log completion of the operation
    pub fn finish(&self, success: bool) {
        let status = if success { "completed" } else { "failed" };
        tracing::info!(
            "{} {} in {:.2}s",
            self.operation,
            status,
            self.start_time.elapsed().as_secs_f64()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty").unwrap(), LogFormat::Pretty);
        assert!(LogFormat::parse("xml").is_err());
    }

    #[test]
    fn test_progress_reporter_throttles() {
        let mut reporter = ProgressReporter::new("export");
        reporter.update(&EngineProgress { ratio: 0.105, time: 1.0 });
        assert_eq!(reporter.last_percent, Some(10));
        reporter.update(&EngineProgress { ratio: 0.101, time: 1.1 });
        assert_eq!(reporter.last_percent, Some(10));
        reporter.update(&EngineProgress { ratio: 0.5, time: 5.0 });
        assert_eq!(reporter.last_percent, Some(50));
    }
}
