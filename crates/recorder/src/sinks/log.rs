//! LogSink - logs record summaries via tracing

use contracts::{CombinedRecord, ContractError, RecordSink};
use tracing::{info, instrument};

/// Sink that logs record summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_record_summary(&self, record: &CombinedRecord) {
        info!(
            sink = %self.name,
            seq = record.seq,
            timestamp_ms = record.timestamp_ms,
            channels = record.samples.len(),
            reused = record.meta.reused_channels.len(),
            overwritten = record.meta.overwritten_updates,
            "CombinedRecord received"
        );
    }
}

impl RecordSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, record),
        fields(sink = %self.name, seq = record.seq)
    )]
    async fn write(&mut self, record: &CombinedRecord) -> Result<(), ContractError> {
        self.log_record_summary(record);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::AlignMeta;

    #[tokio::test]
    async fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        let record = CombinedRecord {
            timestamp_ms: 42,
            seq: 1,
            samples: Vec::new(),
            meta: AlignMeta::default(),
        };

        let result = sink.write(&record).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }
}
