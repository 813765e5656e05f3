//! Layered error definitions
//!
//! Categorized by source: config / clock / payload / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Clock offset was never initialized before the first sensor event.
    /// Fatal: processing an event without it would mis-timestamp data.
    #[error("sensor clock offset not initialized; refusing to timestamp events")]
    ClockNotInitialized,

    // ===== Data Errors =====
    /// Payload shape does not match the channel it arrived on
    #[error("payload shape mismatch on channel '{channel}': {message}")]
    PayloadShape { channel: String, message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create payload shape error
    pub fn payload_shape(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PayloadShape {
            channel: channel.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Whether this error aborts the pipeline (vs. logged and dropped)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ClockNotInitialized | Self::ConfigParse { .. } | Self::ConfigValidation { .. }
        )
    }
}
