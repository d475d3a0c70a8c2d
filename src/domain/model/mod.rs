// Domain models - Core types and data structures

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::rules::TimeMapper;

/// Lower bound of the normalized selection scale
pub const NORMALIZED_MIN: f64 = 0.0;
/// Upper bound of the normalized selection scale
pub const NORMALIZED_MAX: f64 = 100.0;

/// MIME type of the exported video artifact
pub const VIDEO_MIME_TYPE: &str = "video/mpeg";
/// MIME type of the preview frame artifact
pub const PREVIEW_MIME_TYPE: &str = "image/jpg";
/// Suggested download name of the exported video
pub const EXPORT_FILE_NAME: &str = "result.mp4";
/// Suggested name of the preview frame
pub const PREVIEW_FILE_NAME: &str = "first_frame.png";

/// Total length of the source media in seconds, known once metadata is loaded
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct MediaDuration(f64);

impl MediaDuration {
    /// Create a duration, rejecting negative and non-finite values
    pub fn from_seconds(seconds: f64) -> Result<Self, DomainError> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(DomainError::Configuration(format!(
                "Media duration must be a finite, non-negative number of seconds, got {}",
                seconds
            )));
        }
        Ok(Self(seconds))
    }

    pub fn seconds(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for MediaDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

/// Selection on the 0-100 slider scale, independent of media duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRange {
    pub min: f64,
    pub max: f64,
}

impl NormalizedRange {
    /// Build a range, clamping both bounds into [0, 100] and ordering them
    pub fn new(min: f64, max: f64) -> Self {
        let min = Self::clamp_value(min, NORMALIZED_MIN);
        let max = Self::clamp_value(max, NORMALIZED_MAX);
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Full selection (0, 100)
    pub fn full() -> Self {
        Self {
            min: NORMALIZED_MIN,
            max: NORMALIZED_MAX,
        }
    }

    fn clamp_value(value: f64, fallback: f64) -> f64 {
        if value.is_nan() {
            fallback
        } else {
            value.clamp(NORMALIZED_MIN, NORMALIZED_MAX)
        }
    }
}

impl Default for NormalizedRange {
    fn default() -> Self {
        Self::full()
    }
}

/// Selection in absolute seconds. Always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbsoluteRange {
    pub start: f64,
    pub end: f64,
}

impl AbsoluteRange {
    pub fn new(start: f64, end: f64) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::TimelineInconsistency { start, end });
        }
        Ok(Self { start, end })
    }

    /// Length of the window in seconds
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Whether a playback position lies inside the window (bounds inclusive)
    pub fn contains(&self, position: f64) -> bool {
        position >= self.start && position <= self.end
    }
}

impl fmt::Display for AbsoluteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s..{:.3}s", self.start, self.end)
    }
}

/// Current in/out selection
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    range: NormalizedRange,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(&self) -> NormalizedRange {
        self.range
    }

    /// Replace the selection. Out-of-bounds or out-of-order values are clamped.
    pub fn set_range(&mut self, min: f64, max: f64) {
        self.range = NormalizedRange::new(min, max);
    }

    /// Back to the full (0, 100) selection
    pub fn reset(&mut self) {
        self.range = NormalizedRange::full();
    }

    /// Absolute bounds for the given duration
    pub fn absolute_range(&self, duration: MediaDuration) -> Result<AbsoluteRange, DomainError> {
        AbsoluteRange::new(
            TimeMapper::to_absolute_seconds(duration, self.range.min),
            TimeMapper::to_absolute_seconds(duration, self.range.max),
        )
    }
}

/// Overlay transparency (1-100 %) and scale (1-1000 %)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlaySettings {
    pub transparency: u16,
    pub scale: u16,
}

impl OverlaySettings {
    pub const TRANSPARENCY_RANGE: std::ops::RangeInclusive<u16> = 1..=100;
    pub const SCALE_RANGE: std::ops::RangeInclusive<u16> = 1..=1000;

    /// Create settings with bounds validation
    pub fn new(transparency: u16, scale: u16) -> Result<Self, DomainError> {
        if !Self::TRANSPARENCY_RANGE.contains(&transparency) {
            return Err(DomainError::Configuration(format!(
                "Transparency must be between 1 and 100, got {}",
                transparency
            )));
        }
        if !Self::SCALE_RANGE.contains(&scale) {
            return Err(DomainError::Configuration(format!(
                "Scale must be between 1 and 1000, got {}",
                scale
            )));
        }
        Ok(Self {
            transparency,
            scale,
        })
    }
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            transparency: 50,
            scale: 100,
        }
    }
}

/// Overlay settings in the units the engine's filter graph expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineUnits {
    pub opacity: String,
    pub scale_factor: String,
}

/// User-selected source video
#[derive(Debug, Clone)]
pub struct SourceAsset {
    pub name: String,
    pub data: Arc<[u8]>,
}

impl SourceAsset {
    pub fn new(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// User-selected watermark image
#[derive(Debug, Clone)]
pub struct OverlayAsset {
    pub name: String,
    pub data: Arc<[u8]>,
}

impl OverlayAsset {
    pub fn new(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Render mode of one engine action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Trimmed and watermarked video
    Export,
    /// Single watermarked frame
    Preview,
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Export => write!(f, "export"),
            RenderMode::Preview => write!(f, "preview"),
        }
    }
}

/// Output bytes produced by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

impl Artifact {
    /// Exported video, offered as `result.mp4`
    pub fn video(data: Vec<u8>) -> Self {
        Self {
            data,
            mime_type: VIDEO_MIME_TYPE.to_string(),
            file_name: EXPORT_FILE_NAME.to_string(),
        }
    }

    /// Single preview frame
    pub fn preview(data: Vec<u8>) -> Self {
        Self {
            data,
            mime_type: PREVIEW_MIME_TYPE.to_string(),
            file_name: PREVIEW_FILE_NAME.to_string(),
        }
    }

    pub fn for_mode(mode: RenderMode, data: Vec<u8>) -> Self {
        match mode {
            RenderMode::Export => Self::video(data),
            RenderMode::Preview => Self::preview(data),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Playback reposition decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ClampAction {
    None,
    SeekTo(f64),
}

#[cfg(test)]
mod tests;
