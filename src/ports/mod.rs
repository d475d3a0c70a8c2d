// Ports - Interface definitions (contracts)

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::events::EngineEvents;

/// Port for the external transcoding engine.
///
/// The engine owns a flat virtual filesystem addressed by logical names and
/// executes ffmpeg-syntax argument vectors against it. Implementations are
/// shared mutable state without internal ordering guarantees; callers
/// serialize actions.
#[async_trait]
pub trait EnginePort: Send + Sync {
    /// Load the engine binary and prepare its virtual filesystem
    async fn load(&self, config: &EngineLoadConfig) -> Result<(), DomainError>;

    /// Whether `load` has completed
    fn is_loaded(&self) -> bool;

    /// Write bytes under `name` in the virtual filesystem
    async fn write_file(&self, name: &str, data: &[u8]) -> Result<(), DomainError>;

    /// Execute an argument vector, returning the engine's exit code
    async fn exec(&self, args: &[String]) -> Result<i32, DomainError>;

    /// Read bytes stored under `name`
    async fn read_file(&self, name: &str) -> Result<Vec<u8>, DomainError>;

    /// Remove `name` from the virtual filesystem
    async fn delete_file(&self, name: &str) -> Result<(), DomainError>;

    /// Log and progress notifications
    fn events(&self) -> &EngineEvents;
}

/// Engine build to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Threading {
    /// Single-threaded core
    #[default]
    Single,
    /// Multi-threaded core, one worker per CPU
    Multi,
}

impl Threading {
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.to_lowercase().as_str() {
            "single" => Ok(Threading::Single),
            "multi" => Ok(Threading::Multi),
            _ => Err(DomainError::Configuration(format!(
                "Invalid threading mode: {}. Valid modes: single, multi",
                value
            ))),
        }
    }

    /// Worker threads handed to the engine
    pub fn thread_count(&self) -> usize {
        match self {
            Threading::Single => 1,
            Threading::Multi => num_cpus::get().max(1),
        }
    }
}

/// Engine load configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineLoadConfig {
    /// Engine executable
    pub binary: PathBuf,
    pub threading: Threading,
}

impl Default for EngineLoadConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
            threading: Threading::Single,
        }
    }
}

/// Port for discovering source media metadata
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Duration of the media file at `file_path`
    async fn probe_duration(&self, file_path: &str) -> Result<MediaDuration, DomainError>;
}

/// Port for configuration management
#[async_trait]
pub trait ConfigPort: Send + Sync {
    /// Get configuration value
    async fn get_config(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Get configuration value with default
    async fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, DomainError>;

    /// Set configuration value
    async fn set_config(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Load configuration from file
    async fn load_config(&self, file_path: &str) -> Result<(), DomainError>;

    /// Validate configuration
    async fn validate_config(&self) -> Result<(), DomainError>;

    /// Get all configuration keys
    async fn get_all_config_keys(&self) -> Result<Vec<String>, DomainError>;
}

/// Port for logging and observability
#[async_trait]
pub trait LogPort: Send + Sync {
    /// Log info message
    async fn info(&self, message: &str);

    /// Log warning message
    async fn warn(&self, message: &str);

    /// Log error message
    async fn error(&self, message: &str);

    /// Log debug message
    async fn debug(&self, message: &str);
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level_str: &str) -> Result<Self, DomainError> {
        match level_str.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(DomainError::Configuration(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            ))),
        }
    }

    /// Directive string for `EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
