// Unit tests for domain models

#[cfg(test)]
mod tests {
    use crate::domain::errors::*;
    use crate::domain::model::*;

    fn duration(seconds: f64) -> MediaDuration {
        MediaDuration::from_seconds(seconds).unwrap()
    }

    #[test]
    fn test_media_duration_rejects_negative_and_nan() {
        assert!(MediaDuration::from_seconds(-1.0).is_err());
        assert!(MediaDuration::from_seconds(f64::NAN).is_err());
        assert!(MediaDuration::from_seconds(f64::INFINITY).is_err());
        assert_eq!(duration(0.0).seconds(), 0.0);
    }

    #[test]
    fn test_normalized_range_clamps_bounds() {
        let range = NormalizedRange::new(-10.0, 150.0);
        assert_eq!(range, NormalizedRange { min: 0.0, max: 100.0 });
    }

    #[test]
    fn test_normalized_range_orders_bounds() {
        let range = NormalizedRange::new(80.0, 20.0);
        assert_eq!(range.min, 20.0);
        assert_eq!(range.max, 80.0);
    }

    #[test]
    fn test_normalized_range_nan_falls_back_to_full() {
        let range = NormalizedRange::new(f64::NAN, f64::NAN);
        assert_eq!(range, NormalizedRange::full());
    }

    #[test]
    fn test_selection_state_starts_full() {
        let selection = SelectionState::new();
        assert_eq!(selection.range(), NormalizedRange::full());
    }

    #[test]
    fn test_selection_state_reset() {
        let mut selection = SelectionState::new();
        selection.set_range(35.0, 42.0);
        assert_eq!(selection.range(), NormalizedRange { min: 35.0, max: 42.0 });

        selection.reset();
        assert_eq!(selection.range(), NormalizedRange::full());
    }

    #[test]
    fn test_selection_absolute_range() {
        let mut selection = SelectionState::new();
        selection.set_range(20.0, 80.0);

        let range = selection.absolute_range(duration(100.0)).unwrap();
        assert_eq!(range, AbsoluteRange { start: 20.0, end: 80.0 });
    }

    #[test]
    fn test_selection_absolute_range_ordered_for_any_valid_range() {
        let durations = [0.0, 0.5, 7.25, 100.0, 3600.0];
        let values = [0.0, 1.0, 12.5, 33.3, 50.0, 99.9, 100.0];

        for &d in &durations {
            for &min in &values {
                for &max in values.iter().filter(|&&v| v >= min) {
                    let mut selection = SelectionState::new();
                    selection.set_range(min, max);
                    let range = selection.absolute_range(duration(d)).unwrap();
                    assert!(range.start <= range.end, "{} {} {}", d, min, max);
                    assert!(range.end <= d);
                }
            }
        }
    }

    #[test]
    fn test_absolute_range_rejects_inverted_bounds() {
        let err = AbsoluteRange::new(12.0, 5.0).unwrap_err();
        assert_eq!(
            err,
            DomainError::TimelineInconsistency {
                start: 12.0,
                end: 5.0
            }
        );
    }

    #[test]
    fn test_absolute_range_contains_is_inclusive() {
        let range = AbsoluteRange::new(20.0, 80.0).unwrap();
        assert!(range.contains(20.0));
        assert!(range.contains(80.0));
        assert!(!range.contains(80.01));
        assert_eq!(range.length(), 60.0);
    }

    #[test]
    fn test_overlay_settings_bounds() {
        assert!(OverlaySettings::new(1, 1).is_ok());
        assert!(OverlaySettings::new(100, 1000).is_ok());
        assert!(matches!(
            OverlaySettings::new(0, 100),
            Err(DomainError::Configuration(_))
        ));
        assert!(matches!(
            OverlaySettings::new(101, 100),
            Err(DomainError::Configuration(_))
        ));
        assert!(matches!(
            OverlaySettings::new(50, 1001),
            Err(DomainError::Configuration(_))
        ));
    }

    #[test]
    fn test_overlay_settings_default() {
        let settings = OverlaySettings::default();
        assert_eq!(settings.transparency, 50);
        assert_eq!(settings.scale, 100);
    }

    #[test]
    fn test_artifact_kinds() {
        let video = Artifact::video(vec![1, 2, 3]);
        assert_eq!(video.mime_type, "video/mpeg");
        assert_eq!(video.file_name, "result.mp4");
        assert_eq!(video.len(), 3);

        let preview = Artifact::for_mode(RenderMode::Preview, Vec::new());
        assert_eq!(preview.mime_type, "image/jpg");
        assert!(preview.is_empty());
    }
}
