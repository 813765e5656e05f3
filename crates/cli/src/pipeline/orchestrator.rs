//! Pipeline orchestrator - coordinates all components.
//!
//! Wires mock sensor sources through ingestion, alignment and the recorder,
//! owning session lifecycle and shutdown ordering.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use aligner::SampleAligner;
use anyhow::Result;
use contracts::{CombinedRecord, RecordLayout, RecorderBlueprint};
use ingestion::{BackpressureConfig, IngestionPipeline, MockImuSource, SensorClock};
use observability::{record_align_metrics, record_event_received};
use recorder::{create_recorder, RecordingSession};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::PipelineStats;
use crate::error::CliError;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The recorder blueprint configuration
    pub blueprint: RecorderBlueprint,

    /// Maximum number of combined records to produce (None = unlimited)
    pub max_records: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Buffer size for the aligned-record stream
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats, CliError> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)
                .map_err(|e| CliError::pipeline_execution(format!("metrics init failed: {e}")))?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Session rooted at the configured storage directory
        let session = Arc::new(RecordingSession::new(blueprint.storage.base_dir.clone()));
        let session_name = blueprint
            .session
            .name
            .clone()
            .unwrap_or_else(RecordingSession::generate_name);

        let tracked = blueprint.tracked_channels();
        let layout = RecordLayout::new(&tracked);

        // Setup Ingestion
        info!("Setting up ingestion pipeline...");
        let mut ingestion = IngestionPipeline::with_config(BackpressureConfig {
            channel_capacity: blueprint.ingestion.channel_capacity,
            drop_policy: blueprint.ingestion.drop_policy,
        });

        for kind in &tracked {
            let source = MockImuSource::with_rate(*kind, blueprint.rate_for(*kind));
            ingestion.register_source(Box::new(source), None)?;
        }

        let active_channels = ingestion.channel_count();
        info!(active_channels, "Ingestion pipeline configured");

        // Setup Aligner
        let mut aligner = SampleAligner::new(blueprint.to_aligner_config());
        info!(channels = ?tracked, "Sample aligner configured");

        // Setup Recorder
        info!("Setting up recorder...");
        let (record_tx, record_rx) = mpsc::channel::<CombinedRecord>(self.config.buffer_size);

        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - combined records will be dropped");
        }

        let recorder = create_recorder(
            blueprint.sinks.clone(),
            Arc::clone(&session),
            layout,
            record_rx,
        )?;
        let active_sinks = blueprint.sinks.len();
        let recorder_handle = recorder.spawn();

        info!(active_sinks, "Recorder started");

        // Open the session before the first event can reach a sink
        session.start(session_name)?;

        // Start Pipeline
        info!("Starting sensor data ingestion...");
        ingestion.start_all();
        let event_rx = ingestion
            .take_receiver()
            .ok_or_else(|| CliError::pipeline_execution("ingestion receiver already taken"))?;

        let max_records = self.config.max_records;

        info!(max_records = ?max_records, "Pipeline running");

        // Pipeline processing task
        let pipeline_task = async move {
            let mut stats = PipelineStats {
                active_channels,
                active_sinks,
                ..Default::default()
            };
            let mut clock = SensorClock::new();

            while let Ok(event) = event_rx.recv().await {
                stats.events_received += 1;
                record_event_received(event.channel);

                // The first event pins the device-to-wall clock offset
                if !clock.is_initialized() {
                    clock.set_offset(wall_clock_offset_ns(event.timestamp_ns));
                    debug!(offset_ns = ?clock.offset_ns(), "Sensor clock offset captured");
                }

                let reading = clock.normalize(&event)?;

                if let Some(record) = aligner.push(event.channel, reading) {
                    stats.records_combined += 1;

                    // Record metrics from AlignMeta
                    record_align_metrics(&record.meta, record.seq);
                    stats.align_metrics.update(&record.meta, record.timestamp_ms);

                    debug!(
                        seq = record.seq,
                        timestamp_ms = record.timestamp_ms,
                        channels = record.samples.len(),
                        reused = record.meta.reused_channels.len(),
                        overwritten = record.meta.overwritten_updates,
                        "Combined record produced"
                    );

                    if record_tx.send(record).await.is_err() {
                        warn!("Recorder channel closed");
                        break;
                    }

                    // Check max records limit
                    if let Some(max) = max_records {
                        if stats.records_combined >= max {
                            info!(records = stats.records_combined, "Reached max records limit");
                            break;
                        }
                    }
                }
            }

            Ok::<PipelineStats, CliError>(stats)
        };

        // Run with optional timeout
        let result = if let Some(timeout) = self.config.timeout {
            match tokio::time::timeout(timeout, pipeline_task).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(timeout_secs = timeout.as_secs(), "Pipeline timed out");
                    Ok(PipelineStats {
                        active_channels,
                        active_sinks,
                        ..Default::default()
                    })
                }
            }
        } else {
            pipeline_task.await
        };
        let stats = result?;

        // Shutdown
        info!("Shutting down pipeline...");
        ingestion.stop_all();

        // Let the recorder drain its queue before the session closes,
        // otherwise queued rows would hit an idle session and be skipped
        if tokio::time::timeout(Duration::from_secs(5), recorder_handle)
            .await
            .is_err()
        {
            warn!("Recorder did not shut down within 5s");
        }

        session.stop();

        let mut final_stats = stats;
        final_stats.events_dropped = ingestion.metrics().snapshot().events_dropped;
        final_stats.duration = start_time.elapsed();

        info!(
            duration_secs = final_stats.duration.as_secs_f64(),
            rps = format!("{:.2}", final_stats.records_per_sec()),
            "Pipeline shutdown complete"
        );

        Ok(final_stats)
    }
}

/// Offset that maps a device timestamp observed "now" onto the wall clock:
/// canonical = device + offset
fn wall_clock_offset_ns(device_now_ns: i64) -> i64 {
    let wall_ns = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0);
    wall_ns - device_now_ns
}
