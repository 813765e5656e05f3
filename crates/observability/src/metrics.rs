//! 对齐指标收集模块
//!
//! 基于 AlignMeta 收集和统计对齐器的运行指标。

use contracts::{AlignMeta, ChannelKind};
use metrics::{counter, gauge, histogram};

/// 从 AlignMeta 记录指标
///
/// 每次产生 CombinedRecord 时调用此函数来记录指标。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_align_metrics;
///
/// if let Some(record) = aligner.push(channel, reading) {
///     record_align_metrics(&record.meta, record.seq);
///     // ...
/// }
/// ```
pub fn record_align_metrics(meta: &AlignMeta, seq: u64) {
    // 记录计数器
    counter!("imu_recorder_records_total").increment(1);

    // 序号 (用于检测跳号)
    gauge!("imu_recorder_last_seq").set(seq as f64);

    // 本轮被覆盖的中间读数
    if meta.overwritten_updates > 0 {
        counter!("imu_recorder_overwritten_updates_total")
            .increment(meta.overwritten_updates as u64);
    }
    gauge!("imu_recorder_overwritten_updates_current").set(meta.overwritten_updates as f64);

    // 陈旧复用的通道
    let reused_count = meta.reused_channels.len();
    gauge!("imu_recorder_channels_reused").set(reused_count as f64);
    if reused_count > 0 {
        counter!("imu_recorder_records_with_reuse_total").increment(1);
        for channel in &meta.reused_channels {
            counter!("imu_recorder_channel_reused_total", "channel" => channel.as_str())
                .increment(1);
        }
    }

    // 各通道相对主时间戳的偏差
    for (channel, skew) in &meta.skew_ms {
        gauge!(
            "imu_recorder_channel_skew_ms",
            "channel" => channel.as_str()
        )
        .set(*skew as f64);

        histogram!(
            "imu_recorder_channel_skew_ms_hist",
            "channel" => channel.as_str()
        )
        .record(skew.abs() as f64);
    }
}

/// 记录传感器事件接收
pub fn record_event_received(channel: ChannelKind) {
    counter!(
        "imu_recorder_events_received_total",
        "channel" => channel.as_str()
    )
    .increment(1);
}

/// 记录合并记录分发
pub fn record_record_dispatched(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "imu_recorder_records_dispatched_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录单行落盘耗时
pub fn record_append_latency_ms(latency_ms: f64) {
    histogram!("imu_recorder_append_latency_ms").record(latency_ms);
}

/// 记录 sink 队列深度
pub fn record_sink_queue_depth(sink_name: &str, depth: usize) {
    gauge!(
        "imu_recorder_sink_queue_depth",
        "sink" => sink_name.to_string()
    )
    .set(depth as f64);
}

/// 对齐指标聚合器
///
/// 在内存中聚合指标，便于统计和输出停机摘要。
#[derive(Debug, Clone, Default)]
pub struct AlignMetricsAggregator {
    /// 总记录数
    pub total_records: u64,

    /// 陈旧复用读数总数
    pub total_reused: u64,

    /// 被覆盖中间读数总数
    pub total_overwritten: u64,

    /// 含陈旧复用的记录数
    pub records_with_reuse: u64,

    /// 发射间隔统计 (毫秒)
    pub interval_stats: RunningStats,

    /// 各通道偏差统计 (毫秒)
    pub skew_stats: std::collections::HashMap<ChannelKind, RunningStats>,

    /// 各通道陈旧复用次数
    pub reuse_counts: std::collections::HashMap<ChannelKind, u64>,

    /// 上一条记录的时间戳
    last_timestamp_ms: Option<i64>,
}

impl AlignMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, meta: &AlignMeta, timestamp_ms: i64) {
        self.total_records += 1;
        self.total_reused += meta.reused_channels.len() as u64;
        self.total_overwritten += meta.overwritten_updates as u64;

        if !meta.reused_channels.is_empty() {
            self.records_with_reuse += 1;
            for channel in &meta.reused_channels {
                *self.reuse_counts.entry(*channel).or_insert(0) += 1;
            }
        }

        // 发射间隔
        if let Some(last) = self.last_timestamp_ms {
            self.interval_stats.push((timestamp_ms - last) as f64);
        }
        self.last_timestamp_ms = Some(timestamp_ms);

        // 各通道偏差 (取绝对值)
        for (channel, skew) in &meta.skew_ms {
            self.skew_stats
                .entry(*channel)
                .or_default()
                .push(skew.abs() as f64);
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_records: self.total_records,
            total_reused: self.total_reused,
            total_overwritten: self.total_overwritten,
            records_with_reuse: self.records_with_reuse,
            reuse_rate: if self.total_records > 0 {
                self.records_with_reuse as f64 / self.total_records as f64 * 100.0
            } else {
                0.0
            },
            interval_ms: StatsSummary::from(&self.interval_stats),
            channel_reuse_counts: self.reuse_counts.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_records: u64,
    pub total_reused: u64,
    pub total_overwritten: u64,
    pub records_with_reuse: u64,
    pub reuse_rate: f64,
    pub interval_ms: StatsSummary,
    pub channel_reuse_counts: std::collections::HashMap<ChannelKind, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Alignment Metrics Summary ===")?;
        writeln!(f, "Total records: {}", self.total_records)?;
        writeln!(
            f,
            "Records with stale reuse: {} ({:.2}%)",
            self.records_with_reuse, self.reuse_rate
        )?;
        writeln!(f, "Reused readings: {}", self.total_reused)?;
        writeln!(f, "Overwritten updates: {}", self.total_overwritten)?;
        writeln!(f, "Emit interval (ms): {}", self.interval_ms)?;

        if !self.channel_reuse_counts.is_empty() {
            writeln!(f, "Reuse counts by channel:")?;
            for (channel, count) in &self.channel_reuse_counts {
                writeln!(f, "  {}: {}", channel, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
