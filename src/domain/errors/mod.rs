// Domain errors - Error types for the domain layer

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid overlay settings, duration or configuration value
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Export or preview triggered without the assets it needs
    #[error("Asset missing: {0}")]
    AssetMissing(String),

    /// The engine reported a failed execution
    #[error("Engine error: {message}")]
    Engine {
        message: String,
        /// Tail of the engine's own log output
        diagnostics: String,
    },

    /// Derived range with start after end
    #[error("Timeline inconsistency: start ({start}) is after end ({end})")]
    TimelineInconsistency { start: f64, end: f64 },

    /// Another export or preview is still in flight
    #[error("Busy: another render is already in progress")]
    Busy,

    /// Host filesystem failure
    #[error("I/O error: {0}")]
    Io(String),

    /// Invalid arguments provided
    #[error("Bad arguments: {0}")]
    BadArgs(String),
}

impl DomainError {
    /// Engine failure without captured diagnostics
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
            diagnostics: String::new(),
        }
    }

    /// Engine diagnostics, if this is an engine failure
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            DomainError::Engine { diagnostics, .. } if !diagnostics.is_empty() => {
                Some(diagnostics.as_str())
            }
            _ => None,
        }
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}
