//! # Ingestion Pipeline
//!
//! Sensor event ingestion module.
//!
//! Responsibilities:
//! - Register sensor sources per channel (supports Mock and device-backed)
//! - Merge callback events into one `ImuEvent` stream
//! - Backpressure management and drop policy
//! - Clock normalization from device nanoseconds to canonical milliseconds
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{IngestionPipeline, MockImuSource, SensorClock};
//! use contracts::ChannelKind;
//!
//! let mut pipeline = IngestionPipeline::new(100);
//! pipeline.register_source(
//!     Box::new(MockImuSource::with_defaults(ChannelKind::Accel)),
//!     None,
//! )?;
//!
//! let rx = pipeline.take_receiver().unwrap();
//! pipeline.start_all();
//!
//! let clock = SensorClock::with_offset(0);
//! while let Ok(event) = rx.recv().await {
//!     let reading = clock.normalize(&event)?;
//!     // feed the aligner
//! }
//! ```

mod adapter;
mod backpressure;
mod clock;
mod config;
mod error;
mod generic_adapter;
mod mock;
mod pipeline;

// Re-exports
pub use adapter::ChannelAdapter;
pub use clock::SensorClock;
pub use config::{BackpressureConfig, DropPolicy, IngestionMetrics, MetricsSnapshot};
pub use contracts::ImuEvent;
pub use error::{IngestionError, Result};
pub use generic_adapter::GenericChannelAdapter;
pub use mock::{MockImuConfig, MockImuSource};
pub use pipeline::IngestionPipeline;
