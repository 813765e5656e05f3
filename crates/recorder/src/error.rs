//! Recorder error types

use thiserror::Error;

/// Recorder-specific errors
#[derive(Debug, Error)]
pub enum RecorderError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Session name rejected before any directory is touched
    #[error("invalid session name '{name}': {message}")]
    InvalidSessionName { name: String, message: String },

    /// Sink write error (from contract)
    #[error("sink error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecorderError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid session name error
    pub fn invalid_session(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSessionName {
            name: name.into(),
            message: message.into(),
        }
    }
}
