//! 通道适配器 trait

use std::sync::Arc;

use async_channel::Sender;
use contracts::{ChannelKind, ImuEvent};

use crate::config::IngestionMetrics;

/// 通道适配器 trait
///
/// 每个被跟踪的通道持有一个适配器，负责：
/// 1. 注册传感器源回调
/// 2. 将回调事件送入事件通道（处理背压）
/// 3. 维护 listening 状态
pub trait ChannelAdapter: Send + Sync {
    /// 获取通道类型
    fn channel(&self) -> ChannelKind;

    /// 启动事件采集
    ///
    /// # Arguments
    /// * `tx` - 事件发送通道
    /// * `metrics` - 共享的 ingestion 指标
    fn start(&self, tx: Sender<ImuEvent>, metrics: Arc<IngestionMetrics>);

    /// 停止事件采集
    fn stop(&self);

    /// 检查是否正在监听
    fn is_listening(&self) -> bool;
}
