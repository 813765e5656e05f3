//! 通用通道适配器
//!
//! 基于 `SensorSource` trait 的统一适配器实现。
//! 允许 IngestionPipeline 以统一方式处理 Mock 和设备传感器。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_channel::{Receiver, Sender};
use contracts::{ChannelKind, ImuEvent, ImuEventCallback, SensorSource};
use tracing::{debug, trace};

use crate::adapter::ChannelAdapter;
use crate::backpressure::send_event;
use crate::config::{BackpressureConfig, IngestionMetrics};

/// 通用通道适配器
///
/// 将 `SensorSource` trait 适配为 `ChannelAdapter`。
/// 传感器源和事件通道之间的桥梁。
pub struct GenericChannelAdapter {
    channel: ChannelKind,
    source: Box<dyn SensorSource>,
    config: BackpressureConfig,
    /// 同一事件通道的消费端克隆，供 DropOldest 弹出旧事件
    pop_rx: Receiver<ImuEvent>,
    listening: Arc<AtomicBool>,
}

impl GenericChannelAdapter {
    /// 创建新的通用适配器
    pub fn new(
        source: Box<dyn SensorSource>,
        config: BackpressureConfig,
        pop_rx: Receiver<ImuEvent>,
    ) -> Self {
        Self {
            channel: source.channel(),
            source,
            config,
            pop_rx,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl ChannelAdapter for GenericChannelAdapter {
    fn channel(&self) -> ChannelKind {
        self.channel
    }

    fn start(&self, tx: Sender<ImuEvent>, metrics: Arc<IngestionMetrics>) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let channel = self.channel;
        let drop_policy = self.config.drop_policy;
        let listening = self.listening.clone();
        let pop_rx = self.pop_rx.clone();

        debug!(channel = %channel, "starting channel adapter");

        let callback: ImuEventCallback = Arc::new(move |event| {
            if !listening.load(Ordering::Relaxed) {
                return;
            }

            metrics.record_received();
            metrics::counter!("ingestion_events_total", "channel" => channel.as_str())
                .increment(1);
            trace!(channel = %channel, "channel adapter received event");
            send_event(&tx, &pop_rx, event, &metrics, channel, drop_policy);
        });

        self.source.listen(callback);
    }

    fn stop(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            debug!(channel = %self.channel, "stopping channel adapter");
            self.source.stop();
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DropPolicy;
    use async_channel::bounded;
    use contracts::{ChannelValues, RateHint, Vector3};
    use std::time::Duration;

    /// Test SensorSource that emits events from a background thread
    struct TestSensorSource {
        channel: ChannelKind,
        listening: Arc<AtomicBool>,
    }

    impl TestSensorSource {
        fn new(channel: ChannelKind) -> Self {
            Self {
                channel,
                listening: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    impl SensorSource for TestSensorSource {
        fn channel(&self) -> ChannelKind {
            self.channel
        }

        fn rate(&self) -> RateHint {
            RateHint::PeriodMicros(5_000)
        }

        fn listen(&self, callback: ImuEventCallback) {
            if self.listening.swap(true, Ordering::SeqCst) {
                return;
            }

            let channel = self.channel;
            let listening = self.listening.clone();

            std::thread::spawn(move || {
                let mut n: i64 = 0;
                while listening.load(Ordering::Relaxed) {
                    n += 1;
                    callback(ImuEvent {
                        channel,
                        timestamp_ns: n * 5_000_000,
                        values: ChannelValues::Triaxial(Vector3::new(0.0, 0.0, 9.81)),
                    });
                    std::thread::sleep(Duration::from_millis(5));
                }
            });
        }

        fn stop(&self) {
            self.listening.store(false, Ordering::SeqCst);
        }

        fn is_listening(&self) -> bool {
            self.listening.load(Ordering::Relaxed)
        }
    }

    #[test]
    fn test_generic_adapter() {
        let source = TestSensorSource::new(ChannelKind::Accel);
        let (tx, rx) = bounded(10);
        let adapter = GenericChannelAdapter::new(
            Box::new(source),
            BackpressureConfig {
                channel_capacity: 10,
                drop_policy: DropPolicy::DropNewest,
            },
            rx.clone(),
        );
        assert_eq!(adapter.channel(), ChannelKind::Accel);

        let metrics = Arc::new(IngestionMetrics::new());

        adapter.start(tx, metrics.clone());
        assert!(adapter.is_listening());

        // Wait for some events
        std::thread::sleep(Duration::from_millis(100));

        adapter.stop();
        assert!(!adapter.is_listening());

        // Should have received some events on the right channel
        let mut count = 0;
        while let Ok(event) = rx.try_recv() {
            assert_eq!(event.channel, ChannelKind::Accel);
            count += 1;
        }
        assert!(count > 0);
        assert!(metrics.snapshot().events_received > 0);
    }
}
