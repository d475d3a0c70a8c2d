//! Editor session state and its transition rules
//!
//! The session owns every piece of UI-facing state: the source and overlay
//! assets, overlay settings, the known duration, the last playback position
//! and the selection. Each transition is an explicit method; callers apply
//! the returned [`ClampAction`] to their player.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, warn};

use crate::app::render_interactor::{RenderInteractor, RenderRequest};
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::PlaybackClamp;

/// Clears the processing flag when dropped
pub struct ProcessingGuard<'a> {
    flag: &'a AtomicBool,
}

/// A rendered preview frame still on display.
///
/// The session stays busy until the handle is dismissed or dropped.
#[must_use = "dropping a PreviewHandle dismisses the preview"]
pub struct PreviewHandle<'a> {
    artifact: Artifact,
    _guard: ProcessingGuard<'a>,
}

impl PreviewHandle<'_> {
    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    /// Close the preview, releasing the session
    pub fn dismiss(self) -> Artifact {
        debug!("Preview dismissed");
        self.artifact
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub struct EditorSession {
    source: Option<SourceAsset>,
    overlay: Option<OverlayAsset>,
    settings: OverlaySettings,
    duration: Option<MediaDuration>,
    position: Option<f64>,
    selection: SelectionState,
    processing: AtomicBool,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: OverlaySettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Select a new source. The selection starts over at (0, 100).
    pub fn load_source(&mut self, source: SourceAsset) {
        debug!(name = %source.name, bytes = source.data.len(), "Source loaded");
        self.source = Some(source);
        self.clear_timeline();
    }

    /// Drop the source; selection, duration and position are reset
    pub fn remove_source(&mut self) {
        if let Some(source) = self.source.take() {
            debug!(name = %source.name, "Source removed");
        }
        self.clear_timeline();
    }

    pub fn set_overlay(&mut self, overlay: OverlayAsset) {
        debug!(name = %overlay.name, "Overlay selected");
        self.overlay = Some(overlay);
    }

    pub fn clear_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn set_overlay_settings(&mut self, settings: OverlaySettings) {
        self.settings = settings;
    }

    /// Source metadata arrived
    pub fn on_duration_known(&mut self, duration: MediaDuration) -> ClampAction {
        debug!(%duration, "Source duration known");
        self.duration = Some(duration);
        self.clamp_current()
    }

    /// Player reported a new position
    pub fn update_position(&mut self, position: f64) -> ClampAction {
        self.position = Some(position);
        self.clamp_current()
    }

    /// User moved the range control.
    ///
    /// Once the duration is known, every change scrubs playback to the
    /// start of the new window, whichever handle moved.
    pub fn set_range(&mut self, min: f64, max: f64) -> ClampAction {
        self.selection.set_range(min, max);
        let current = self.selection.range();
        if current.min != min || current.max != max {
            warn!(
                requested_min = min,
                requested_max = max,
                min = current.min,
                max = current.max,
                "Selection clamped"
            );
        }

        let Some(window) = self.absolute_range() else {
            return ClampAction::None;
        };
        self.apply(ClampAction::SeekTo(window.start))
    }

    pub fn source(&self) -> Option<&SourceAsset> {
        self.source.as_ref()
    }

    pub fn overlay(&self) -> Option<&OverlayAsset> {
        self.overlay.as_ref()
    }

    pub fn settings(&self) -> OverlaySettings {
        self.settings
    }

    pub fn duration(&self) -> Option<MediaDuration> {
        self.duration
    }

    pub fn position(&self) -> Option<f64> {
        self.position
    }

    pub fn selection(&self) -> NormalizedRange {
        self.selection.range()
    }

    /// Selected window in seconds, once the duration is known
    pub fn absolute_range(&self) -> Option<AbsoluteRange> {
        let duration = self.duration?;
        match self.selection.absolute_range(duration) {
            Ok(range) => Some(range),
            Err(err) => {
                error!(error = %err, "Selection produced an inconsistent window");
                None
            }
        }
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// Whether export/preview controls should be enabled
    pub fn can_render(&self) -> bool {
        self.source.is_some() && self.overlay.is_some() && !self.is_processing()
    }

    /// Mark an action as in flight. Fails with `Busy` if one already is.
    pub fn begin_processing(&self) -> Result<ProcessingGuard<'_>, DomainError> {
        self.processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| DomainError::Busy)?;
        Ok(ProcessingGuard {
            flag: &self.processing,
        })
    }

    /// Render the trimmed, watermarked video
    pub async fn export(&self, interactor: &RenderInteractor) -> Result<Artifact, DomainError> {
        let request = self.render_request(RenderMode::Export)?;
        let _guard = self.begin_processing()?;
        interactor.render(request).await
    }

    /// Render the first watermarked frame and dismiss it right away
    pub async fn preview(&self, interactor: &RenderInteractor) -> Result<Artifact, DomainError> {
        Ok(self.open_preview(interactor).await?.dismiss())
    }

    /// Render the first watermarked frame and keep it open.
    /// Other actions fail with `Busy` until the handle is dismissed.
    pub async fn open_preview(
        &self,
        interactor: &RenderInteractor,
    ) -> Result<PreviewHandle<'_>, DomainError> {
        let request = self.render_request(RenderMode::Preview)?;
        let guard = self.begin_processing()?;
        let artifact = interactor.render(request).await?;
        Ok(PreviewHandle {
            artifact,
            _guard: guard,
        })
    }

    /// Request for the current state, without touching the engine
    pub fn render_request(&self, mode: RenderMode) -> Result<RenderRequest, DomainError> {
        let source = self
            .source
            .clone()
            .ok_or_else(|| DomainError::AssetMissing("no source video selected".to_string()))?;
        let overlay = self
            .overlay
            .clone()
            .ok_or_else(|| DomainError::AssetMissing("no overlay image selected".to_string()))?;

        let window = match mode {
            RenderMode::Export => Some(self.absolute_range().ok_or_else(|| {
                DomainError::AssetMissing("source duration not known yet".to_string())
            })?),
            RenderMode::Preview => None,
        };

        Ok(RenderRequest {
            mode,
            source,
            overlay,
            settings: self.settings,
            window,
        })
    }

    fn clamp_current(&mut self) -> ClampAction {
        let Some(position) = self.position else {
            return ClampAction::None;
        };
        let window = self.absolute_range();
        let action = PlaybackClamp::decide(position, window.as_ref());
        self.apply(action)
    }

    fn apply(&mut self, action: ClampAction) -> ClampAction {
        if let ClampAction::SeekTo(target) = action {
            debug!(target, "Repositioning playback");
            self.position = Some(target);
        }
        action
    }

    fn clear_timeline(&mut self) {
        self.selection.reset();
        self.duration = None;
        self.position = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duration(seconds: f64) -> MediaDuration {
        MediaDuration::from_seconds(seconds).unwrap()
    }

    fn loaded_session() -> EditorSession {
        let mut session = EditorSession::new();
        session.load_source(SourceAsset::new("clip.mp4", vec![0u8; 4]));
        session.on_duration_known(duration(100.0));
        session
    }

    #[test]
    fn test_position_updates_clamp_to_window() {
        let mut session = loaded_session();
        session.set_range(20.0, 80.0);

        assert_eq!(session.update_position(10.0), ClampAction::SeekTo(20.0));
        assert_eq!(session.position(), Some(20.0));
        assert_eq!(session.update_position(50.0), ClampAction::None);
        assert_eq!(session.update_position(85.0), ClampAction::SeekTo(20.0));
        assert_eq!(session.update_position(80.0), ClampAction::None);
    }

    #[test]
    fn test_moving_start_handle_scrubs_to_start() {
        let mut session = loaded_session();
        session.update_position(50.0);
        assert_eq!(session.set_range(30.0, 100.0), ClampAction::SeekTo(30.0));
        assert_eq!(session.position(), Some(30.0));
    }

    #[test]
    fn test_moving_end_handle_scrubs_to_start() {
        let mut session = loaded_session();
        session.update_position(50.0);

        assert_eq!(session.set_range(0.0, 70.0), ClampAction::SeekTo(0.0));
        assert_eq!(session.position(), Some(0.0));

        session.set_range(10.0, 70.0);
        session.update_position(60.0);
        assert_eq!(session.set_range(10.0, 90.0), ClampAction::SeekTo(10.0));
    }

    #[test]
    fn test_range_before_duration_is_noop() {
        let mut session = EditorSession::new();
        session.load_source(SourceAsset::new("clip.mp4", vec![1u8]));
        session.update_position(90.0);
        assert_eq!(session.set_range(20.0, 40.0), ClampAction::None);
        assert_eq!(session.absolute_range(), None);
    }

    #[test]
    fn test_duration_arrival_clamps_existing_position() {
        let mut session = EditorSession::new();
        session.load_source(SourceAsset::new("clip.mp4", vec![1u8]));
        session.set_range(50.0, 60.0);
        session.update_position(5.0);
        assert_eq!(session.on_duration_known(duration(10.0)), ClampAction::None);

        session.update_position(2.0);
        assert_eq!(session.position(), Some(5.0));
    }

    #[test]
    fn test_remove_source_resets_selection() {
        let mut session = loaded_session();
        session.set_range(12.0, 34.0);
        session.update_position(20.0);

        session.remove_source();

        assert_eq!(session.selection(), NormalizedRange::full());
        assert!(session.source().is_none());
        assert_eq!(session.duration(), None);
        assert_eq!(session.position(), None);
    }

    #[test]
    fn test_load_source_starts_full_selection() {
        let mut session = loaded_session();
        session.set_range(40.0, 45.0);
        session.load_source(SourceAsset::new("other.mp4", vec![2u8]));
        assert_eq!(session.selection(), NormalizedRange::full());
        assert_eq!(session.duration(), None);
    }

    #[test]
    fn test_set_range_clamps_out_of_bounds() {
        let mut session = loaded_session();
        session.set_range(-5.0, 140.0);
        assert_eq!(session.selection(), NormalizedRange::full());
        session.set_range(70.0, 30.0);
        assert_eq!(session.selection(), NormalizedRange { min: 30.0, max: 70.0 });
    }

    #[test]
    fn test_can_render_requires_both_assets() {
        let mut session = loaded_session();
        assert!(!session.can_render());
        session.set_overlay(OverlayAsset::new("logo.png", vec![3u8]));
        assert!(session.can_render());
        session.clear_overlay();
        assert!(!session.can_render());
    }

    #[test]
    fn test_render_request_missing_assets() {
        let session = EditorSession::new();
        assert!(matches!(
            session.render_request(RenderMode::Preview),
            Err(DomainError::AssetMissing(_))
        ));
    }

    #[test]
    fn test_export_request_needs_duration() {
        let mut session = EditorSession::new();
        session.load_source(SourceAsset::new("clip.mp4", vec![1u8]));
        session.set_overlay(OverlayAsset::new("logo.png", vec![3u8]));

        assert!(session.render_request(RenderMode::Preview).is_ok());
        assert!(matches!(
            session.render_request(RenderMode::Export),
            Err(DomainError::AssetMissing(_))
        ));
    }

    #[test]
    fn test_processing_guard_clears_flag() {
        let session = loaded_session();
        {
            let _guard = session.begin_processing().unwrap();
            assert!(session.is_processing());
            assert!(matches!(session.begin_processing(), Err(DomainError::Busy)));
        }
        assert!(!session.is_processing());
    }
}
