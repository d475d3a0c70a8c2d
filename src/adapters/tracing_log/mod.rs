// Tracing log adapter - Structured logging using tracing crate

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::ports::*;

/// Tracing log adapter
pub struct TracingLogAdapter {
    min_level: LogLevel,
}

impl TracingLogAdapter {
    /// Create new tracing log adapter. Subscriber setup lives in
    /// [`crate::utils::logging::init_logging`].
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    /// Check if log level should be logged
    fn should_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }
}

impl Default for TracingLogAdapter {
    fn default() -> Self {
        Self::new(LogLevel::Trace)
    }
}

#[async_trait]
impl LogPort for TracingLogAdapter {
    async fn info(&self, message: &str) {
        if self.should_log(LogLevel::Info) {
            info!(target: "trimark", "{}", message);
        }
    }

    async fn warn(&self, message: &str) {
        if self.should_log(LogLevel::Warn) {
            warn!(target: "trimark", "{}", message);
        }
    }

    async fn error(&self, message: &str) {
        if self.should_log(LogLevel::Error) {
            error!(target: "trimark", "{}", message);
        }
    }

    async fn debug(&self, message: &str) {
        if self.should_log(LogLevel::Debug) {
            debug!(target: "trimark", "{}", message);
        }
    }
}
