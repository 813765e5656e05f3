//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Pipeline execution error
    #[error("Pipeline execution failed: {message}")]
    PipelineExecution { message: String },

    /// Recorder setup or session error
    #[error(transparent)]
    Recorder(#[from] recorder::RecorderError),

    /// Sensor registration error
    #[error(transparent)]
    Ingestion(#[from] ingestion::IngestionError),

    /// Contract-level error surfaced by the pipeline
    #[error(transparent)]
    Contract(#[from] contracts::ContractError),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn pipeline_execution(message: impl Into<String>) -> Self {
        Self::PipelineExecution {
            message: message.into(),
        }
    }
}
