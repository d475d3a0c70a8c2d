// Domain rules - Timeline mapping, playback clamping and overlay unit conversion

use crate::domain::model::*;

/// Normalized-to-absolute time conversion. The only place the formula lives.
pub struct TimeMapper;

impl TimeMapper {
    /// `duration * normalized / 100`
    ///
    /// `normalized` is expected in [0, 100]. A zero duration yields zero.
    pub fn to_absolute_seconds(duration: MediaDuration, normalized: f64) -> f64 {
        let seconds = duration.seconds();
        if seconds == 0.0 {
            return 0.0;
        }
        seconds * normalized / NORMALIZED_MAX
    }
}

/// Loop-back rules for playback inside the selected window
pub struct PlaybackClamp;

impl PlaybackClamp {
    /// Decide whether playback has to be repositioned.
    ///
    /// Positions before the window seek to its start, positions past its end
    /// loop back to the start. Both bounds are inclusive. An unknown window
    /// (duration not loaded yet) never triggers a seek.
    pub fn decide(position: f64, window: Option<&AbsoluteRange>) -> ClampAction {
        let Some(window) = window else {
            return ClampAction::None;
        };

        if position < window.start || position > window.end {
            ClampAction::SeekTo(window.start)
        } else {
            ClampAction::None
        }
    }
}

/// Conversion of overlay settings into filter-graph parameters
pub struct OverlayParameters;

impl OverlayParameters {
    /// Opacity and scale factor as fractions with exactly two decimals
    pub fn to_engine_units(settings: &OverlaySettings) -> EngineUnits {
        EngineUnits {
            opacity: Self::percent_to_fraction(settings.transparency),
            scale_factor: Self::percent_to_fraction(settings.scale),
        }
    }

    fn percent_to_fraction(percent: u16) -> String {
        format!("{:.2}", f64::from(percent) / 100.0)
    }
}
