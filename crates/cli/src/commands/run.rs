//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref base_dir) = args.base_dir {
        info!(base_dir = %base_dir.display(), "Overriding storage base dir from CLI");
        blueprint.storage.base_dir = base_dir.clone();
    }
    if let Some(ref session) = args.session {
        info!(session = %session, "Overriding session name from CLI");
        blueprint.session.name = Some(session.clone());
    }

    info!(
        base_dir = %blueprint.storage.base_dir.display(),
        channels = blueprint.channels.len(),
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        blueprint,
        max_records: if args.max_records == 0 {
            None
        } else {
            Some(args.max_records)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        buffer_size: args.buffer_size,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        records_combined = stats.records_combined,
                        events_received = stats.events_received,
                        duration_secs = stats.duration.as_secs_f64(),
                        rps = format!("{:.2}", stats.records_per_sec()),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("IMU Recorder finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::RecorderBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Storage:");
    println!("  Base dir: {}", blueprint.storage.base_dir.display());
    println!(
        "  Session: {}",
        blueprint
            .session
            .name
            .as_deref()
            .unwrap_or("(generated at start)")
    );

    println!("\nChannels ({}):", blueprint.channels.len());
    for channel in &blueprint.channels {
        println!("  - {} @ {:.1} Hz", channel.kind, channel.rate.hz());
    }

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!("\nIngestion:");
    println!("  Queue capacity: {}", blueprint.ingestion.channel_capacity);
    println!("  Drop policy: {:?}", blueprint.ingestion.drop_policy);

    println!();
}
