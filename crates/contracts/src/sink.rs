//! RecordSink trait - Recorder output interface
//!
//! Defines the abstract interface for Sinks.

use crate::{CombinedRecord, ContractError};

/// Record output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(RecordSink: Send)]
pub trait LocalRecordSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one combined record
    ///
    /// An inactive recording session is not an error; sinks that gate on
    /// session state return `Ok` without writing.
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, record: &CombinedRecord) -> Result<(), ContractError>;

    /// Flush buffered state (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
