// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod memory_engine;
pub mod probe_ffprobe;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use exec_ffmpeg::FfmpegProcessEngine;
pub use memory_engine::{ExecBehavior, InMemoryEngine};
pub use probe_ffprobe::FFprobeAdapter;
pub use toml_config::TomlConfigAdapter;
pub use tracing_log::TracingLogAdapter;
