//! Command-line argument definitions

use clap::Args;

use crate::domain::model::{NORMALIZED_MAX, NORMALIZED_MIN};

fn parse_transparency(s: &str) -> Result<u16, String> {
    clap_num::number_range(s, 1, 100)
}

fn parse_scale(s: &str) -> Result<u16, String> {
    clap_num::number_range(s, 1, 1000)
}

fn parse_percent(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{} is not a finite number", s))
    }
}

/// Watermark appearance shared by every command
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct OverlayArgs {
    /// Watermark opacity in percent (1-100, default from config)
    #[arg(long, value_parser = parse_transparency)]
    pub transparency: Option<u16>,

    /// Watermark width relative to its natural size, in percent (1-1000)
    #[arg(long, value_parser = parse_scale)]
    pub scale: Option<u16>,
}

/// Trim window as percentages of the source duration
#[derive(Args, Debug, Clone, Copy)]
pub struct RangeArgs {
    /// Window start, percent of the duration
    #[arg(long, default_value_t = NORMALIZED_MIN, value_parser = parse_percent, allow_negative_numbers = true)]
    pub from: f64,

    /// Window end, percent of the duration
    #[arg(long, default_value_t = NORMALIZED_MAX, value_parser = parse_percent, allow_negative_numbers = true)]
    pub to: f64,
}

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Source video file path
    #[arg(short, long)]
    pub input: String,

    /// Watermark image file path
    #[arg(short, long)]
    pub watermark: String,

    #[command(flatten)]
    pub range: RangeArgs,

    #[command(flatten)]
    pub overlay: OverlayArgs,

    /// Source duration (HH:MM:SS.ms, MM:SS.ms, or seconds); probed when absent
    #[arg(long)]
    pub duration: Option<String>,

    /// Output file path (default: export_file_name from config)
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the preview command
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Source video file path
    #[arg(short, long)]
    pub input: String,

    /// Watermark image file path
    #[arg(short, long)]
    pub watermark: String,

    #[command(flatten)]
    pub overlay: OverlayArgs,

    /// Output file path (default: preview_file_name from config)
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Source duration (HH:MM:SS.ms, MM:SS.ms, or seconds); required for export plans
    #[arg(long)]
    pub duration: Option<String>,

    #[command(flatten)]
    pub range: RangeArgs,

    #[command(flatten)]
    pub overlay: OverlayArgs,

    /// Plan the preview command instead of the export
    #[arg(long)]
    pub preview: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
