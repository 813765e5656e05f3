//! Record Pipeline Demo
//!
//! Demonstrates reading a single configuration file, wiring mock IMU sources,
//! aligning the channel streams, and recording combined rows to CSV.
//!
//! Run with: cargo run --bin record_pipeline [config_path]

use std::sync::Arc;
use std::time::Duration;

use aligner::SampleAligner;
use config_loader::{ConfigFormat, ConfigLoader};
use contracts::{CombinedRecord, RecorderBlueprint};
use ingestion::{IngestionPipeline, MockImuSource, SensorClock};
use observability::AlignMetricsAggregator;
use recorder::{create_recorder, RecordingSession};
use tokio::sync::mpsc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Record Pipeline Demo");

    let blueprint = resolve_blueprint()?;
    info!(
        base_dir = %blueprint.storage.base_dir.display(),
        channels = blueprint.channels.len(),
        "Blueprint loaded"
    );

    // ==== Stage 1: Session and Recorder ====
    let session = Arc::new(RecordingSession::new(blueprint.storage.base_dir.clone()));
    let session_name = blueprint
        .session
        .name
        .clone()
        .unwrap_or_else(RecordingSession::generate_name);

    let tracked = blueprint.tracked_channels();
    let layout = contracts::RecordLayout::new(&tracked);

    let (record_tx, record_rx) = mpsc::channel::<CombinedRecord>(100);
    let recorder = create_recorder(
        blueprint.sinks.clone(),
        Arc::clone(&session),
        layout,
        record_rx,
    )?;
    let recorder_handle = recorder.spawn();

    session.start(&session_name)?;
    info!(session = %session_name, "Recording session started");

    // ==== Stage 2: Mock Sources described by config ====
    let mut ingestion = IngestionPipeline::new(blueprint.ingestion.channel_capacity);
    for kind in &tracked {
        let source = MockImuSource::with_rate(*kind, blueprint.rate_for(*kind));
        ingestion.register_source(Box::new(source), None)?;
        info!(channel = %kind, "Registered mock sensor source");
    }

    // ==== Stage 3: Sample Aligner ====
    let mut aligner = SampleAligner::new(blueprint.to_aligner_config());

    // ==== Stage 4: Run Pipeline ====
    let target_records = 200u64;
    info!(target_records, "Running pipeline");

    ingestion.start_all();
    let event_rx = ingestion.take_receiver().ok_or("ingestion receiver gone")?;

    let pipeline_handle = tokio::spawn(async move {
        let mut clock = SensorClock::new();
        let mut aggregator = AlignMetricsAggregator::new();
        let mut combined = 0u64;

        while let Ok(event) = event_rx.recv().await {
            if !clock.is_initialized() {
                // Mock timestamps are already wall-clock based
                clock.set_offset(0);
            }

            let reading = match clock.normalize(&event) {
                Ok(reading) => reading,
                Err(e) => {
                    tracing::error!(error = %e, "Clock normalization failed");
                    break;
                }
            };

            if let Some(record) = aligner.push(event.channel, reading) {
                combined += 1;
                aggregator.update(&record.meta, record.timestamp_ms);

                if combined % 50 == 0 {
                    info!(
                        seq = record.seq,
                        timestamp_ms = record.timestamp_ms,
                        "Combined record produced"
                    );
                }

                if record_tx.send(record).await.is_err() {
                    break;
                }
                if combined >= target_records {
                    break;
                }
            }
        }

        (combined, aggregator)
    });

    // Wait for pipeline with timeout
    let result = tokio::time::timeout(Duration::from_secs(10), pipeline_handle).await;

    // ==== Stage 5: Graceful Shutdown ====
    info!("Shutting down...");

    ingestion.stop_all();
    let _ = tokio::time::timeout(Duration::from_secs(2), recorder_handle).await;
    session.stop();

    match result {
        Ok(Ok((count, aggregator))) => {
            info!(records = count, "Pipeline completed successfully");
            println!("{}", aggregator.summary());
        }
        Ok(Err(e)) => info!("Pipeline task error: {:?}", e),
        Err(_) => info!("Pipeline timed out"),
    }

    let csv_path = blueprint
        .storage
        .base_dir
        .join(recorder::DATASET_DIR)
        .join(&session_name)
        .join(recorder::IMU_FILE);
    info!(path = %csv_path.display(), "Dataset written");

    info!("Record Pipeline Demo finished");
    Ok(())
}

/// Load the blueprint from the CLI argument, or fall back to a minimal
/// default rooted at ./data
fn resolve_blueprint() -> Result<RecorderBlueprint, Box<dyn std::error::Error>> {
    if let Some(path) = std::env::args().nth(1) {
        info!(path = %path, "Loading blueprint config");
        return Ok(ConfigLoader::load_from_path(std::path::Path::new(&path))?);
    }

    let blueprint = ConfigLoader::load_from_str("[storage]\nbase_dir = \"data\"", ConfigFormat::Toml)?;
    Ok(blueprint)
}
