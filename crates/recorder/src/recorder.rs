//! Recorder - main loop for fan-out to sinks

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use contracts::{CombinedRecord, RecordLayout, SinkConfig, SinkType};

use crate::error::RecorderError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::session::RecordingSession;
use crate::sinks::{CsvSink, LogSink};

/// Recorder configuration
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Sink configurations
    pub sinks: Vec<SinkConfig>,
}

/// Builder for creating a Recorder
pub struct RecorderBuilder {
    config: RecorderConfig,
    session: Arc<RecordingSession>,
    layout: RecordLayout,
    input_rx: mpsc::Receiver<CombinedRecord>,
}

impl RecorderBuilder {
    /// Create a new RecorderBuilder
    pub fn new(
        config: RecorderConfig,
        session: Arc<RecordingSession>,
        layout: RecordLayout,
        input_rx: mpsc::Receiver<CombinedRecord>,
    ) -> Self {
        Self {
            config,
            session,
            layout,
            input_rx,
        }
    }

    /// Build and start the recorder
    #[instrument(name = "recorder_builder_build", skip(self))]
    pub fn build(self) -> Result<Recorder, RecorderError> {
        let handles = Self::initialize_handles(&self.config, &self.session, &self.layout)?;

        Ok(Recorder {
            handles,
            input_rx: self.input_rx,
        })
    }

    #[instrument(
        name = "recorder_initialize_handles",
        skip(config, session, layout),
        fields(sink_count = config.sinks.len())
    )]
    fn initialize_handles(
        config: &RecorderConfig,
        session: &Arc<RecordingSession>,
        layout: &RecordLayout,
    ) -> Result<Vec<SinkHandle>, RecorderError> {
        let mut handles = Vec::with_capacity(config.sinks.len());
        for sink_config in &config.sinks {
            handles.push(create_sink_handle(sink_config, session, layout)?);
        }
        Ok(handles)
    }
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "recorder_create_sink_handle",
    skip(config, session, layout),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink_handle(
    config: &SinkConfig,
    session: &Arc<RecordingSession>,
    layout: &RecordLayout,
) -> Result<SinkHandle, RecorderError> {
    if config.queue_capacity == 0 {
        return Err(RecorderError::sink_creation(
            &config.name,
            "queue capacity must be greater than zero",
        ));
    }

    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::Csv => {
            let sink = CsvSink::new(&config.name, Arc::clone(session), layout.clone());
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// The main Recorder that fans out combined records to sinks
#[derive(Debug)]
pub struct Recorder {
    handles: Vec<SinkHandle>,
    input_rx: mpsc::Receiver<CombinedRecord>,
}

impl Recorder {
    /// Create a recorder with custom sink handles (for testing)
    pub fn with_handles(
        handles: Vec<SinkHandle>,
        input_rx: mpsc::Receiver<CombinedRecord>,
    ) -> Self {
        Self { handles, input_rx }
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Run the recorder main loop
    ///
    /// Consumes records from input and fans out to all sinks.
    /// Returns when input channel is closed.
    #[instrument(name = "recorder_run", skip(self))]
    pub async fn run(mut self) {
        info!(sinks = self.handles.len(), "Recorder started");

        let mut record_count: u64 = 0;

        while let Some(record) = self.input_rx.recv().await {
            record_count += 1;
            self.dispatch_record(&record);

            if record_count.is_multiple_of(100) {
                debug!(records = record_count, "Recorder progress");
            }
        }

        info!(
            records = record_count,
            "Recorder input closed, shutting down"
        );

        Self::shutdown_handles(self.handles).await;

        info!("Recorder shutdown complete");
    }

    /// Spawn the recorder as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    fn dispatch_record(&self, record: &CombinedRecord) {
        for handle in &self.handles {
            handle.try_send(record.clone());
        }
    }

    async fn shutdown_handles(handles: Vec<SinkHandle>) {
        for handle in handles {
            handle.shutdown().await;
        }
    }
}

/// Convenience function to create a recorder from sink configs
#[instrument(name = "recorder_create", skip(sink_configs, session, layout, input_rx))]
pub fn create_recorder(
    sink_configs: Vec<SinkConfig>,
    session: Arc<RecordingSession>,
    layout: RecordLayout,
    input_rx: mpsc::Receiver<CombinedRecord>,
) -> Result<Recorder, RecorderError> {
    let config = RecorderConfig {
        sinks: sink_configs,
    };
    RecorderBuilder::new(config, session, layout, input_rx).build()
}
