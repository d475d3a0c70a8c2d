//! Export and preview command construction

use tracing::debug;

use crate::domain::model::{AbsoluteRange, EngineUnits, RenderMode};
use crate::planner::*;
use crate::utils::time::format_engine_seconds;

/// Builds engine commands from timeline and overlay state
pub struct CommandBuilder;

impl CommandBuilder {
    /// Filter graph compositing the watermark over the source.
    ///
    /// Order is fixed: alpha-capable format, opacity, scale, then overlay
    /// anchored at the bottom-right corner.
    pub fn overlay_filter(units: &EngineUnits) -> String {
        format!(
            "[1:v]format={},colorchannelmixer=aa={},scale=iw*{}:-1[watermark];[0:v][watermark]overlay=W-w:H-h",
            ALPHA_PIXEL_FORMAT, units.opacity, units.scale_factor
        )
    }

    /// Trimmed, watermarked video with the audio stream copied through
    pub fn build_export_command(range: &AbsoluteRange, units: &EngineUnits) -> CommandSpec {
        let mut args = Self::overlay_args(units);
        args.extend(
            [
                "-c:a".to_string(),
                "copy".to_string(),
                "-preset".to_string(),
                ENCODE_PRESET.to_string(),
                "-ss".to_string(),
                format_engine_seconds(range.start),
                "-to".to_string(),
                format_engine_seconds(range.end),
                "-y".to_string(),
                EXPORT_OUTPUT_FILE.to_string(),
            ]
            .into_iter(),
        );

        let spec = CommandSpec {
            mode: RenderMode::Export,
            inputs: Self::inputs(),
            output: EXPORT_OUTPUT_FILE.to_string(),
            args,
        };
        debug!(window = %range, "Built export command: {}", spec.display_line());
        spec
    }

    /// First composited frame as a still image, no trim window
    pub fn build_preview_command(units: &EngineUnits) -> CommandSpec {
        let mut args = Self::overlay_args(units);
        args.extend(
            [
                "-vframes".to_string(),
                "1".to_string(),
                PREVIEW_OUTPUT_FILE.to_string(),
            ]
            .into_iter(),
        );

        let spec = CommandSpec {
            mode: RenderMode::Preview,
            inputs: Self::inputs(),
            output: PREVIEW_OUTPUT_FILE.to_string(),
            args,
        };
        debug!("Built preview command: {}", spec.display_line());
        spec
    }

    fn overlay_args(units: &EngineUnits) -> Vec<String> {
        vec![
            "-i".to_string(),
            SOURCE_FILE.to_string(),
            "-i".to_string(),
            WATERMARK_FILE.to_string(),
            "-filter_complex".to_string(),
            Self::overlay_filter(units),
        ]
    }

    fn inputs() -> Vec<String> {
        vec![SOURCE_FILE.to_string(), WATERMARK_FILE.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::OverlaySettings;
    use crate::domain::rules::OverlayParameters;

    fn units(opacity: &str, scale_factor: &str) -> EngineUnits {
        EngineUnits {
            opacity: opacity.to_string(),
            scale_factor: scale_factor.to_string(),
        }
    }

    fn position_of(args: &[String], flag: &str) -> usize {
        args.iter()
            .position(|a| a == flag)
            .unwrap_or_else(|| panic!("missing {}", flag))
    }

    #[test]
    fn test_overlay_filter_exact() {
        assert_eq!(
            CommandBuilder::overlay_filter(&units("0.50", "1.00")),
            "[1:v]format=yuva444p,colorchannelmixer=aa=0.50,scale=iw*1.00:-1[watermark];[0:v][watermark]overlay=W-w:H-h"
        );
    }

    #[test]
    fn test_export_command() {
        let range = AbsoluteRange::new(5.0, 12.0).unwrap();
        let spec = CommandBuilder::build_export_command(&range, &units("0.50", "1.00"));

        assert_eq!(spec.mode, RenderMode::Export);
        assert_eq!(spec.output, "output.mp4");
        assert_eq!(spec.inputs, vec!["input.mp4", "watermark.jpg"]);

        let args = spec.argv();
        let filter = &args[position_of(args, "-filter_complex") + 1];
        assert_eq!(
            filter,
            "[1:v]format=yuva444p,colorchannelmixer=aa=0.50,scale=iw*1.00:-1[watermark];[0:v][watermark]overlay=W-w:H-h"
        );
        assert_eq!(args[position_of(args, "-ss") + 1], "5");
        assert_eq!(args[position_of(args, "-to") + 1], "12");
        assert_eq!(args[position_of(args, "-c:a") + 1], "copy");
        assert_eq!(args[position_of(args, "-preset") + 1], "ultrafast");
        assert!(args.contains(&"-y".to_string()));
        assert_eq!(args.last().unwrap(), "output.mp4");
    }

    #[test]
    fn test_export_command_argument_order() {
        let range = AbsoluteRange::new(1.5, 3.25).unwrap();
        let spec = CommandBuilder::build_export_command(&range, &units("0.30", "0.75"));
        let expected: Vec<String> = [
            "-i",
            "input.mp4",
            "-i",
            "watermark.jpg",
            "-filter_complex",
            "[1:v]format=yuva444p,colorchannelmixer=aa=0.30,scale=iw*0.75:-1[watermark];[0:v][watermark]overlay=W-w:H-h",
            "-c:a",
            "copy",
            "-preset",
            "ultrafast",
            "-ss",
            "1.5",
            "-to",
            "3.25",
            "-y",
            "output.mp4",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(spec.args, expected);
    }

    #[test]
    fn test_preview_command_single_frame_no_trim() {
        let settings = OverlaySettings::new(25, 150).unwrap();
        let spec = CommandBuilder::build_preview_command(&OverlayParameters::to_engine_units(&settings));

        assert_eq!(spec.mode, RenderMode::Preview);
        assert_eq!(spec.output, "first_frame.png");
        let args = spec.argv();
        assert_eq!(args[position_of(args, "-vframes") + 1], "1");
        assert!(!args.contains(&"-ss".to_string()));
        assert!(!args.contains(&"-to".to_string()));
        assert!(args[position_of(args, "-filter_complex") + 1].contains("aa=0.25,scale=iw*1.50:-1"));
        assert_eq!(args.last().unwrap(), "first_frame.png");
    }

    #[test]
    fn test_display_line_quotes_filter() {
        let spec = CommandBuilder::build_preview_command(&units("0.50", "1.00"));
        let line = spec.display_line();
        assert!(line.starts_with("-i input.mp4 -i watermark.jpg -filter_complex \"[1:v]"));
        assert!(line.ends_with("-vframes 1 first_frame.png"));
    }
}
