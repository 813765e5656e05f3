//! CsvSink - appends one CSV row per combined record
//!
//! Durability discipline: every append runs a full open → (header?) → row →
//! flush → close cycle, so a crash never costs a completed row. The header
//! is written once per session epoch; while the session is idle the sink
//! skips appends silently.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use contracts::{ChannelValues, CombinedRecord, ContractError, RecordLayout, RecordSink};
use tracing::{debug, error, instrument, trace};

use crate::session::{ActiveSession, RecordingSession};

/// Sink that appends combined records to the session CSV file
pub struct CsvSink {
    name: String,
    session: Arc<RecordingSession>,
    layout: RecordLayout,
    /// Session epoch the header was last written for (0 = never)
    header_epoch: u64,
}

impl CsvSink {
    /// Create a new CsvSink bound to a shared session
    pub fn new(
        name: impl Into<String>,
        session: Arc<RecordingSession>,
        layout: RecordLayout,
    ) -> Self {
        Self {
            name: name.into(),
            session,
            layout,
            header_epoch: 0,
        }
    }

    /// Column layout this sink writes
    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    fn append_to_disk(&mut self, path: &Path, epoch: u64, row: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().append(true).create(true).open(path)?;

        if self.header_epoch != epoch {
            writeln!(file, "{}", self.layout.header())?;
            file.flush()?;
            // The marker advances only after the header actually hit the file
            self.header_epoch = epoch;
            debug!(sink = %self.name, epoch, path = %path.display(), "CSV header written");
        }

        writeln!(file, "{row}")?;
        file.flush()?;
        Ok(())
        // File handle drops here: one full open/close cycle per row
    }

    /// Build one row in layout column order; a missing channel is a write error
    fn format_row(&self, record: &CombinedRecord) -> Result<String, ContractError> {
        let mut fields = Vec::with_capacity(self.layout.column_count());
        fields.push(record.timestamp_ms.to_string());

        for &kind in self.layout.channels() {
            let sample = record.sample(kind).ok_or_else(|| {
                ContractError::sink_write(
                    &self.name,
                    format!("record {} is missing channel {kind}", record.seq),
                )
            })?;
            push_values(&mut fields, &sample.reading.values);
        }

        Ok(fields.join(","))
    }

    fn persist_record(
        &mut self,
        active: &ActiveSession,
        record: &CombinedRecord,
    ) -> Result<(), ContractError> {
        let row = self.format_row(record)?;
        self.append_to_disk(&active.csv_path, active.epoch, &row)
            .map_err(|e| {
                error!(
                    sink = %self.name,
                    path = %active.csv_path.display(),
                    seq = record.seq,
                    error = %e,
                    "Write failed"
                );
                ContractError::sink_write(&self.name, e.to_string())
            })
    }
}

fn push_values(fields: &mut Vec<String>, values: &ChannelValues) {
    match values {
        ChannelValues::Triaxial(v) => {
            fields.push(v.x.to_string());
            fields.push(v.y.to_string());
            fields.push(v.z.to_string());
        }
        ChannelValues::Uncalibrated(u) => {
            fields.push(u.axes.x.to_string());
            fields.push(u.axes.y.to_string());
            fields.push(u.axes.z.to_string());
            fields.push(u.bias.x.to_string());
            fields.push(u.bias.y.to_string());
            fields.push(u.bias.z.to_string());
        }
    }
}

impl RecordSink for CsvSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "csv_sink_write",
        skip(self, record),
        fields(sink = %self.name, seq = record.seq)
    )]
    async fn write(&mut self, record: &CombinedRecord) -> Result<(), ContractError> {
        let Some(active) = self.session.snapshot() else {
            trace!(sink = %self.name, seq = record.seq, "Session idle, record skipped");
            return Ok(());
        };
        self.persist_record(&active, record)
    }

    #[instrument(name = "csv_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Every append flushes before closing, nothing is buffered here
        Ok(())
    }

    #[instrument(name = "csv_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        debug!(sink = %self.name, "CsvSink closed");
        Ok(())
    }
}
