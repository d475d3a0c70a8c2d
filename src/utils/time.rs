//! Time parsing and formatting utilities

use crate::domain::errors::DomainError;

/// Render seconds the way the engine's `-ss`/`-to` flags receive them:
/// shortest round-trip form, so `5.0` becomes `5` and `12.5` stays `12.5`.
pub fn format_engine_seconds(seconds: f64) -> String {
    format!("{}", seconds)
}

/// Time parser for engine log timestamps and CLI durations
pub struct TimeParser;

impl TimeParser {
    /// Parse `SS.ms`, `MM:SS.ms` or `HH:MM:SS.ms` into seconds
    pub fn parse_time(time_str: &str) -> Result<f64, DomainError> {
        let time_str = time_str.trim();
        let invalid = || {
            DomainError::BadArgs(format!(
                "Invalid time format: {}. Expected HH:MM:SS.ms, MM:SS.ms, or seconds",
                time_str
            ))
        };

        let mut seconds = 0.0;
        let parts: Vec<&str> = time_str.split(':').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(invalid());
        }

        for part in &parts {
            let value: f64 = part.parse().map_err(|_| invalid())?;
            if !value.is_finite() || value < 0.0 {
                return Err(invalid());
            }
            seconds = seconds * 60.0 + value;
        }

        Ok(seconds)
    }

    /// Format seconds to HH:MM:SS.ms, dropping the hours when zero
    pub fn format_time(seconds: f64) -> String {
        let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let secs = (total_ms % 60_000) / 1000;
        let milliseconds = total_ms % 1000;

        if hours > 0 {
            format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, milliseconds)
        } else {
            format!("{:02}:{:02}.{:03}", minutes, secs, milliseconds)
        }
    }
}
