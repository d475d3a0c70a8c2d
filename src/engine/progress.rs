//! Progress extraction from engine log output
//!
//! The engine prints a `Duration: HH:MM:SS.xx` banner for each input and
//! periodic `time=HH:MM:SS.xx` status lines while encoding. The first valid
//! banner is taken as the total.

use serde::{Deserialize, Serialize};

use crate::utils::time::TimeParser;

/// One progress notification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineProgress {
    /// Completed fraction in [0, 1], 0 while the total is unknown
    pub ratio: f64,
    /// Encoded media time in seconds
    pub time: f64,
}

/// Stateful parser over a single execution's log lines
#[derive(Debug, Default)]
pub struct ProgressParser {
    total: Option<f64>,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser with a known total, e.g. the length of a trim window
    pub fn with_total(total: f64) -> Self {
        Self {
            total: (total > 0.0).then_some(total),
        }
    }

    pub fn total(&self) -> Option<f64> {
        self.total
    }

    /// Feed one log line; returns a notification for status lines
    pub fn feed(&mut self, line: &str) -> Option<EngineProgress> {
        if self.total.is_none() {
            if let Some(total) = Self::field(line, "Duration:").filter(|t| *t > 0.0) {
                self.total = Some(total);
                return None;
            }
        }

        let time = Self::field(line, "time=")?;
        let ratio = match self.total {
            Some(total) => (time / total).clamp(0.0, 1.0),
            None => 0.0,
        };
        Some(EngineProgress { ratio, time })
    }

    fn field(line: &str, key: &str) -> Option<f64> {
        let start = line.find(key)? + key.len();
        let value = line[start..]
            .trim_start()
            .split(|c: char| c.is_whitespace() || c == ',')
            .next()?;
        TimeParser::parse_time(value).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_banner_sets_total() {
        let mut parser = ProgressParser::new();
        let line = "  Duration: 00:00:10.00, start: 0.000000, bitrate: 1205 kb/s";
        assert_eq!(parser.feed(line), None);
        assert_eq!(parser.total(), Some(10.0));
    }

    #[test]
    fn test_first_banner_wins() {
        let mut parser = ProgressParser::new();
        parser.feed("  Duration: 00:01:00.00, start: 0.000000");
        parser.feed("  Duration: 00:00:00.04, start: 0.000000");
        assert_eq!(parser.total(), Some(60.0));
    }

    #[test]
    fn test_unavailable_duration_ignored() {
        let mut parser = ProgressParser::new();
        parser.feed("  Duration: N/A, bitrate: N/A");
        assert_eq!(parser.total(), None);
    }

    #[test]
    fn test_status_line_progress() {
        let mut parser = ProgressParser::with_total(10.0);
        let line = "frame=  120 fps= 60 q=28.0 size=     256kB time=00:00:05.00 bitrate= 419.4kbits/s speed=2.5x";
        let progress = parser.feed(line).unwrap();
        assert_eq!(progress.time, 5.0);
        assert_eq!(progress.ratio, 0.5);
    }

    #[test]
    fn test_status_line_without_total() {
        let mut parser = ProgressParser::new();
        let progress = parser.feed("size=1kB time=00:00:01.50 bitrate=N/A").unwrap();
        assert_eq!(progress.ratio, 0.0);
        assert_eq!(progress.time, 1.5);
    }

    #[test]
    fn test_ratio_clamped() {
        let mut parser = ProgressParser::with_total(2.0);
        let progress = parser.feed("time=00:00:03.00").unwrap();
        assert_eq!(progress.ratio, 1.0);
    }

    #[test]
    fn test_unrelated_line() {
        let mut parser = ProgressParser::new();
        assert_eq!(parser.feed("Stream mapping:"), None);
        assert_eq!(parser.feed("time=N/A bitrate=N/A"), None);
    }
}
