//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// IMU Recorder - Inertial stream synchronization and recording pipeline
#[derive(Parser, Debug)]
#[command(
    name = "imu-recorder",
    author,
    version,
    about = "IMU stream synchronization and recording pipeline",
    long_about = "Synchronizes multi-channel inertial sensor streams into combined \n\
                  records, applies gravity compensation on accelerometer channels, \n\
                  and appends rows durably to per-session CSV files."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "IMU_RECORDER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "IMU_RECORDER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the recording pipeline
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "IMU_RECORDER_CONFIG"
    )]
    pub config: PathBuf,

    /// Override session name from configuration
    #[arg(long, env = "IMU_RECORDER_SESSION")]
    pub session: Option<String>,

    /// Override storage base directory from configuration
    #[arg(long, env = "IMU_RECORDER_BASE_DIR")]
    pub base_dir: Option<PathBuf>,

    /// Maximum number of combined records to write (0 = unlimited)
    #[arg(long, default_value = "0", env = "IMU_RECORDER_MAX_RECORDS")]
    pub max_records: u64,

    /// Pipeline timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "IMU_RECORDER_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without recording
    #[arg(long)]
    pub dry_run: bool,

    /// Buffer size for the aligned-record stream
    #[arg(long, default_value = "100", env = "IMU_RECORDER_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "IMU_RECORDER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show detailed channel information
    #[arg(long)]
    pub channels: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
