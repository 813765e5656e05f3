//! # Recorder
//!
//! 记录落盘模块。
//!
//! 负责：
//! - 消费 `CombinedRecord`
//! - Fan-out 到多个 sinks
//! - 会话生命周期（标题行每会话一次，逐行 flush）
//! - 隔离慢 sink，不阻塞对齐链路

pub mod error;
pub mod handle;
pub mod metrics;
pub mod recorder;
pub mod session;
pub mod sinks;

pub use contracts::{CombinedRecord, RecordSink};
pub use error::RecorderError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use recorder::{create_recorder, Recorder, RecorderBuilder, RecorderConfig};
pub use session::{ActiveSession, RecordingSession, DATASET_DIR, IMU_FILE};
pub use sinks::{CsvSink, LogSink};
