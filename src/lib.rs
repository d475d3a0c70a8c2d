//! trimark library
//!
//! Trims a source video to a selected window and burns a scaled,
//! semi-transparent watermark into its bottom-right corner by driving ffmpeg.
//! The editor state lives in [`app::EditorSession`]; renders go through
//! [`app::RenderInteractor`] and the [`ports::EnginePort`] boundary.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod output;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{DefaultAppContainer, EditorSession, RenderInteractor};
pub use domain::errors::DomainError;
pub use domain::model::{
    AbsoluteRange, Artifact, ClampAction, MediaDuration, NormalizedRange, OverlayAsset,
    OverlaySettings, RenderMode, SourceAsset,
};
pub use engine::EngineAdapter;
pub use planner::{CommandBuilder, CommandSpec};
