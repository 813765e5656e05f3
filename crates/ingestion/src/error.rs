//! Ingestion 错误类型

use contracts::ChannelKind;
use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 通道已注册
    #[error("channel {channel} is already registered")]
    DuplicateChannel {
        /// 通道类型
        channel: ChannelKind,
    },

    /// 采样率提示非法
    #[error("invalid rate hint for channel {channel}: {message}")]
    InvalidRate {
        /// 通道类型
        channel: ChannelKind,
        /// 错误消息
        message: String,
    },
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
