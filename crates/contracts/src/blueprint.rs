//! RecorderBlueprint - Config Loader 输出
//!
//! 描述完整的录制配置：通道集合、采样率、存储位置、会话、输出路由。

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::{AlignerConfig, ChannelKind};

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的录制配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 存储设置
    pub storage: StorageConfig,

    /// 跟踪的通道列表
    #[serde(default = "default_channels")]
    pub channels: Vec<ChannelConfig>,

    /// 会话设置
    #[serde(default)]
    pub session: SessionConfig,

    /// 摄取背压设置
    #[serde(default)]
    pub ingestion: IngestionSettings,

    /// 输出路由配置
    #[serde(default = "default_sinks")]
    pub sinks: Vec<SinkConfig>,
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 数据集根目录; 实际写入 `<base_dir>/dataset_recorder/<session>/imu.csv`
    pub base_dir: PathBuf,
}

/// 通道配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// 通道类型
    pub kind: ChannelKind,

    /// 采样率提示 (传给传感器源; 核心不校验实际到达率)
    #[serde(default)]
    pub rate: RateHint,
}

fn default_channels() -> Vec<ChannelConfig> {
    [
        ChannelKind::Accel,
        ChannelKind::Gyro,
        ChannelKind::GyroUncalibrated,
    ]
    .into_iter()
    .map(|kind| ChannelConfig {
        kind,
        rate: RateHint::default(),
    })
    .collect()
}

/// 采样率提示
///
/// 注册时传给传感器源的期望速率。仅为提示, 源可自行取整或忽略。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateHint {
    /// 频率 (Hz)
    Hz(f64),

    /// 采样周期 (微秒)
    PeriodMicros(u64),
}

impl Default for RateHint {
    fn default() -> Self {
        // 10ms 周期, 即 100Hz
        RateHint::PeriodMicros(10_000)
    }
}

impl RateHint {
    /// 换算为采样周期
    pub fn period(&self) -> Duration {
        match *self {
            RateHint::Hz(hz) if hz > 0.0 => Duration::from_secs_f64(1.0 / hz),
            RateHint::Hz(_) => Duration::ZERO,
            RateHint::PeriodMicros(us) => Duration::from_micros(us),
        }
    }

    /// 换算为频率 (Hz)
    pub fn hz(&self) -> f64 {
        match *self {
            RateHint::Hz(hz) => hz,
            RateHint::PeriodMicros(0) => 0.0,
            RateHint::PeriodMicros(us) => 1_000_000.0 / us as f64,
        }
    }
}

/// 会话配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// 会话名称; 为空时由宿主生成时间戳名称
    #[serde(default)]
    pub name: Option<String>,
}

/// 摄取背压设置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionSettings {
    /// 事件通道容量
    #[serde(default = "default_event_capacity")]
    pub channel_capacity: usize,

    /// 丢包策略 (背压满时)
    #[serde(default)]
    pub drop_policy: DropPolicy,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            channel_capacity: default_event_capacity(),
            drop_policy: DropPolicy::default(),
        }
    }
}

fn default_event_capacity() -> usize {
    100
}

/// 丢包策略 (背压满时)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// 丢弃最旧的事件
    #[default]
    DropOldest,

    /// 丢弃最新的事件
    DropNewest,
}

/// Sink 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink 名称
    pub name: String,

    /// Sink 类型
    pub sink_type: SinkType,

    /// 队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    100
}

fn default_sinks() -> Vec<SinkConfig> {
    vec![SinkConfig {
        name: "imu_csv".to_string(),
        sink_type: SinkType::Csv,
        queue_capacity: default_queue_capacity(),
    }]
}

/// Sink 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// CSV 文件输出
    Csv,

    /// 日志输出
    Log,
}

impl RecorderBlueprint {
    /// Build the aligner configuration from the tracked channel list
    pub fn to_aligner_config(&self) -> AlignerConfig {
        AlignerConfig::with_channels(self.tracked_channels())
    }

    /// Tracked channel kinds (configuration order, duplicates removed)
    pub fn tracked_channels(&self) -> Vec<ChannelKind> {
        let mut seen = Vec::new();
        for channel in &self.channels {
            if !seen.contains(&channel.kind) {
                seen.push(channel.kind);
            }
        }
        seen
    }

    /// Rate hint for one channel (default when not configured)
    pub fn rate_for(&self, kind: ChannelKind) -> RateHint {
        self.channels
            .iter()
            .find(|channel| channel.kind == kind)
            .map(|channel| channel.rate)
            .unwrap_or_default()
    }
}
