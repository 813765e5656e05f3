//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    storage: StorageInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    channels: Vec<ChannelInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
    session: SessionInfo,
}

#[derive(Serialize)]
struct StorageInfo {
    base_dir: String,
    csv_target: String,
}

#[derive(Serialize)]
struct ChannelInfo {
    kind: String,
    rate_hz: f64,
    components: usize,
    primary: bool,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

#[derive(Serialize)]
struct SessionInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

/// Render the per-session CSV path pattern for display
fn csv_target(blueprint: &contracts::RecorderBlueprint) -> String {
    blueprint
        .storage
        .base_dir
        .join(recorder::DATASET_DIR)
        .join("<session>")
        .join(recorder::IMU_FILE)
        .display()
        .to_string()
}

fn build_config_info(blueprint: &contracts::RecorderBlueprint, args: &InfoArgs) -> ConfigInfo {
    let channels = if args.channels {
        blueprint
            .channels
            .iter()
            .map(|c| ChannelInfo {
                kind: c.kind.as_str().to_string(),
                rate_hz: c.rate.hz(),
                components: c.kind.component_count(),
                primary: c.kind.is_primary(),
            })
            .collect()
    } else {
        Vec::new()
    };

    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        storage: StorageInfo {
            base_dir: blueprint.storage.base_dir.display().to_string(),
            csv_target: csv_target(blueprint),
        },
        channels,
        sinks,
        session: SessionInfo {
            name: blueprint.session.name.clone(),
        },
    }
}

fn print_config_info(blueprint: &contracts::RecorderBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               IMU Recorder Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Storage info
    println!("📍 Storage");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Base dir: {}", blueprint.storage.base_dir.display());
    println!("   └─ CSV target: {}", csv_target(blueprint));

    // Channels
    println!("\n📡 Channels ({})", blueprint.channels.len());
    for (i, channel) in blueprint.channels.iter().enumerate() {
        let is_last = i == blueprint.channels.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };

        if args.channels {
            let role = if channel.kind.is_primary() {
                "primary"
            } else {
                "non-resetting"
            };
            println!(
                "   {} {} ({:.1} Hz, {} components, {})",
                prefix,
                channel.kind,
                channel.rate.hz(),
                channel.kind.component_count(),
                role
            );
        } else {
            println!("   {} {}", prefix, channel.kind);
        }
    }

    // Session
    println!("\n⚙️  Session");
    match &blueprint.session.name {
        Some(name) => println!("   └─ Name: {}", name),
        None => println!("   └─ Name: (generated at start)"),
    }

    // Sinks
    if !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let is_last = i == blueprint.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            println!(
                "   {} {} ({:?}, queue {})",
                prefix, sink.name, sink.sink_type, sink.queue_capacity
            );
        }
    }

    println!();
}
