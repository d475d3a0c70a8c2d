//! CLI module for trimark
//!
//! This module handles command-line argument parsing and command execution.

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// trimark - Trim a video and stamp a watermark on it
///
/// Cuts a window out of a source video and overlays a scaled,
/// semi-transparent image in the bottom-right corner using ffmpeg.
#[derive(Parser, Debug)]
#[command(name = "trimark")]
#[command(about = "trimark - Trim videos and overlay a watermark")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file with a [trimark] table
    #[arg(long, global = true, env = "TRIMARK_CONFIG")]
    pub config: Option<String>,

    /// Engine threading mode (single, multi)
    #[arg(long, global = true)]
    pub threading: Option<String>,

    /// Path to the ffmpeg executable
    #[arg(long, global = true)]
    pub ffmpeg: Option<String>,

    /// Path to the ffprobe executable
    #[arg(long, global = true)]
    pub ffprobe: Option<String>,

    /// Replace existing output files
    #[arg(long, global = true)]
    pub overwrite: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trim the source video and burn in the watermark
    Export(args::ExportArgs),
    /// Render the first frame with the watermark applied
    Preview(args::PreviewArgs),
    /// Print the engine command without running it
    Plan(args::PlanArgs),
}
