//! FFprobe adapter for media duration discovery

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    binary: PathBuf,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Parse the single-value output of `-show_entries format=duration`
    fn parse_duration(stdout: &str) -> Result<MediaDuration, DomainError> {
        let value = stdout.trim();
        let seconds: f64 = value.parse().map_err(|_| {
            DomainError::AssetMissing(format!("Source duration unavailable: {:?}", value))
        })?;
        MediaDuration::from_seconds(seconds)
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe_duration(&self, file_path: &str) -> Result<MediaDuration, DomainError> {
        let output = Command::new(&self.binary)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(file_path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                DomainError::engine(format!(
                    "Failed to start {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(DomainError::Engine {
                message: format!("Failed to probe {}", file_path),
                diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let duration = Self::parse_duration(&String::from_utf8_lossy(&output.stdout))?;
        debug!(file = file_path, %duration, "Probed source duration");
        Ok(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        let duration = FFprobeAdapter::parse_duration("12.480000\n").unwrap();
        assert_eq!(duration.seconds(), 12.48);
    }

    #[test]
    fn test_parse_duration_not_available() {
        assert!(matches!(
            FFprobeAdapter::parse_duration("N/A\n"),
            Err(DomainError::AssetMissing(_))
        ));
    }
}
