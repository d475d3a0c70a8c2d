//! Engine command planning
//!
//! Turns the current selection and overlay parameters into the argument
//! vector the transcoding engine executes.

use serde::{Deserialize, Serialize};

use crate::domain::model::RenderMode;

pub mod command;

pub use command::CommandBuilder;

/// Logical name of the source video in the engine's virtual filesystem
pub const SOURCE_FILE: &str = "input.mp4";
/// Logical name of the watermark image in the engine's virtual filesystem
pub const WATERMARK_FILE: &str = "watermark.jpg";
/// Logical name of the exported video
pub const EXPORT_OUTPUT_FILE: &str = "output.mp4";
/// Logical name of the preview frame
pub const PREVIEW_OUTPUT_FILE: &str = "first_frame.png";

/// Pixel format with an alpha channel, required before the alpha multiplier
pub const ALPHA_PIXEL_FORMAT: &str = "yuva444p";
/// Encoder preset; the engine runs with a tight compute budget
pub const ENCODE_PRESET: &str = "ultrafast";

/// A complete engine instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Export or preview
    pub mode: RenderMode,
    /// Virtual files that must be materialized before execution
    pub inputs: Vec<String>,
    /// Virtual file the engine writes
    pub output: String,
    /// Argument vector, in engine syntax
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn argv(&self) -> &[String] {
        &self.args
    }

    /// Shell-ish rendering for logs and dry runs
    pub fn display_line(&self) -> String {
        self.args
            .iter()
            .map(|arg| {
                if arg.contains([' ', ';', '[', ']']) {
                    format!("\"{}\"", arg)
                } else {
                    arg.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
