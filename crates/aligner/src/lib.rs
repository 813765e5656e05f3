//! # Aligner
//!
//! 多通道惯性采样对齐引擎。
//!
//! 负责：
//! - 事件驱动同步触发 (每通道一次更新, 凑齐即发射)
//! - 加速度通道重力补偿 (指数低通滤波)
//! - 输出 `CombinedRecord`
//!
//! ## 使用示例
//!
//! ```ignore
//! use aligner::{AlignerConfig, SampleAligner};
//!
//! let mut aligner = SampleAligner::new(AlignerConfig::default());
//!
//! // Push readings as they arrive
//! if let Some(record) = aligner.push(channel, reading) {
//!     // Handle combined record
//! }
//! ```

mod engine;
mod gravity;
mod slot;

pub use engine::SampleAligner;
pub use gravity::{GravityFilter, GRAVITY_ALPHA};
pub use slot::ChannelSlot;

// Re-export contracts types
pub use contracts::{
    AlignMeta, AlignerConfig, ChannelKind, ChannelReading, ChannelSample, CombinedRecord,
    RecordLayout,
};
