//! Mock 传感器源
//!
//! 用于无真实 IMU 硬件的测试和演示。
//! 实现 `SensorSource` trait，在后台线程按指定速率生成合成数据，
//! 通过回调发送，与设备传感器行为一致。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use contracts::{
    ChannelKind, ChannelValues, ImuEvent, ImuEventCallback, RateHint, SensorSource,
    UncalibratedTriad, Vector3,
};
use tracing::{debug, trace};

/// Mock 传感器源配置
#[derive(Debug, Clone)]
pub struct MockImuConfig {
    /// 采样率
    pub rate: RateHint,

    /// 波形振幅 (加速度 x/y 分量和角速度分量)
    pub amplitude: f32,
}

impl Default for MockImuConfig {
    fn default() -> Self {
        Self {
            rate: RateHint::default(),
            amplitude: 0.2,
        }
    }
}

/// Mock 传感器源
///
/// 按指定速率在后台线程生成合成 IMU 数据。加速度计通道带恒定重力
/// 分量 (z = 9.81)，角速度通道为低幅正弦波，未校准通道带固定偏置。
pub struct MockImuSource {
    channel: ChannelKind,
    config: MockImuConfig,
    listening: Arc<AtomicBool>,
}

impl MockImuSource {
    /// 创建新的 Mock 源
    pub fn new(channel: ChannelKind, config: MockImuConfig) -> Self {
        Self {
            channel,
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 使用默认配置创建
    pub fn with_defaults(channel: ChannelKind) -> Self {
        Self::new(channel, MockImuConfig::default())
    }

    /// 指定速率创建
    pub fn with_rate(channel: ChannelKind, rate: RateHint) -> Self {
        Self::new(
            channel,
            MockImuConfig {
                rate,
                ..Default::default()
            },
        )
    }

    /// 生成一帧合成数据
    fn generate_values(channel: ChannelKind, amplitude: f32, frame: u64) -> ChannelValues {
        let phase = frame as f32 * 0.1;

        if channel.is_accelerometer() {
            let axes = Vector3::new(amplitude * phase.sin(), amplitude * phase.cos(), 9.81);
            if channel.is_uncalibrated() {
                ChannelValues::Uncalibrated(UncalibratedTriad {
                    axes,
                    bias: Vector3::new(0.01, -0.02, 0.005),
                })
            } else {
                ChannelValues::Triaxial(axes)
            }
        } else {
            let axes = Vector3::new(
                amplitude * phase.sin(),
                amplitude * phase.cos(),
                amplitude * 0.25,
            );
            if channel.is_uncalibrated() {
                ChannelValues::Uncalibrated(UncalibratedTriad {
                    axes,
                    bias: Vector3::new(0.002, 0.001, -0.003),
                })
            } else {
                ChannelValues::Triaxial(axes)
            }
        }
    }
}

impl SensorSource for MockImuSource {
    fn channel(&self) -> ChannelKind {
        self.channel
    }

    fn rate(&self) -> RateHint {
        self.config.rate
    }

    fn listen(&self, callback: ImuEventCallback) {
        // Idempotent: if already listening, don't start again
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let channel = self.channel;
        let config = self.config.clone();
        let listening = self.listening.clone();
        let period = config.rate.period();

        thread::spawn(move || {
            let base_ns = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as i64)
                .unwrap_or(0);
            let period_ns = period.as_nanos() as i64;
            let mut frame: u64 = 0;

            debug!(
                channel = %channel,
                rate_hz = config.rate.hz(),
                "mock sensor started"
            );

            while listening.load(Ordering::Relaxed) {
                frame += 1;
                let timestamp_ns = base_ns + frame as i64 * period_ns;
                let values = MockImuSource::generate_values(channel, config.amplitude, frame);

                callback(ImuEvent {
                    channel,
                    timestamp_ns,
                    values,
                });

                trace!(channel = %channel, frame, timestamp_ns, "mock event sent");

                thread::sleep(period);
            }

            debug!(channel = %channel, "mock sensor stopped");
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
