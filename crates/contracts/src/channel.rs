//! ImuEvent - Ingestion 输出
//!
//! 原始惯性传感器事件结构。

use serde::{Deserialize, Serialize};

/// 惯性传感器通道
///
/// 每个通道对应一条独立的物理传感器流。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// 校准加速度计 (m/s²)
    Accel,

    /// 未校准加速度计 (m/s² + 偏置估计)
    AccelUncalibrated,

    /// 校准陀螺仪 (rad/s)
    Gyro,

    /// 未校准陀螺仪 (rad/s + 偏置估计)
    GyroUncalibrated,
}

impl ChannelKind {
    /// 规范通道顺序 (记录列布局使用)
    pub const CANONICAL: [ChannelKind; 4] = [
        ChannelKind::Accel,
        ChannelKind::AccelUncalibrated,
        ChannelKind::Gyro,
        ChannelKind::GyroUncalibrated,
    ];

    /// 是否为加速度通道 (需要重力补偿)
    pub fn is_accelerometer(self) -> bool {
        matches!(
            self,
            ChannelKind::Accel | ChannelKind::AccelUncalibrated
        )
    }

    /// 是否为主通道 (发射后清除就绪状态)
    pub fn is_primary(self) -> bool {
        matches!(self, ChannelKind::Accel | ChannelKind::Gyro)
    }

    /// 是否为未校准通道 (携带偏置估计)
    pub fn is_uncalibrated(self) -> bool {
        matches!(
            self,
            ChannelKind::AccelUncalibrated | ChannelKind::GyroUncalibrated
        )
    }

    /// 通道值分量数 (3 或 6)
    pub fn component_count(self) -> usize {
        if self.is_uncalibrated() {
            6
        } else {
            3
        }
    }

    /// CSV 列名 (按规范顺序)
    pub fn column_names(self) -> &'static [&'static str] {
        match self {
            ChannelKind::Accel => &["ax", "ay", "az"],
            ChannelKind::AccelUncalibrated => {
                &["ax_uncal", "ay_uncal", "az_uncal", "abx", "aby", "abz"]
            }
            ChannelKind::Gyro => &["gx", "gy", "gz"],
            ChannelKind::GyroUncalibrated => {
                &["gx_uncal", "gy_uncal", "gz_uncal", "gbx", "gby", "gbz"]
            }
        }
    }

    /// 稳定字符串标识 (日志/配置使用)
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelKind::Accel => "accel",
            ChannelKind::AccelUncalibrated => "accel_uncalibrated",
            ChannelKind::Gyro => "gyro",
            ChannelKind::GyroUncalibrated => "gyro_uncalibrated",
        }
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 3D 向量
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// 向量模长
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// 未校准读数: 轴值 + 偏置估计
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UncalibratedTriad {
    /// 未校准轴值
    pub axes: Vector3,

    /// 硬件偏置估计
    pub bias: Vector3,
}

/// 通道数值载荷
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelValues {
    /// 校准通道: 3 轴
    Triaxial(Vector3),

    /// 未校准通道: 3 轴 + 3 偏置
    Uncalibrated(UncalibratedTriad),
}

impl ChannelValues {
    /// 轴值分量 (偏置不含)
    pub fn axes(&self) -> Vector3 {
        match self {
            ChannelValues::Triaxial(v) => *v,
            ChannelValues::Uncalibrated(u) => u.axes,
        }
    }

    /// 偏置估计 (仅未校准通道)
    pub fn bias(&self) -> Option<Vector3> {
        match self {
            ChannelValues::Triaxial(_) => None,
            ChannelValues::Uncalibrated(u) => Some(u.bias),
        }
    }

    /// 替换轴值, 保留偏置 (重力补偿使用)
    pub fn with_axes(&self, axes: Vector3) -> ChannelValues {
        match self {
            ChannelValues::Triaxial(_) => ChannelValues::Triaxial(axes),
            ChannelValues::Uncalibrated(u) => ChannelValues::Uncalibrated(UncalibratedTriad {
                axes,
                bias: u.bias,
            }),
        }
    }

    /// 载荷形状是否匹配通道类型
    pub fn matches(&self, kind: ChannelKind) -> bool {
        match self {
            ChannelValues::Triaxial(_) => !kind.is_uncalibrated(),
            ChannelValues::Uncalibrated(_) => kind.is_uncalibrated(),
        }
    }

    /// 分量数 (3 或 6)
    pub fn component_count(&self) -> usize {
        match self {
            ChannelValues::Triaxial(_) => 3,
            ChannelValues::Uncalibrated(_) => 6,
        }
    }
}

/// 通道读数
///
/// 时间戳已归一化为规范毫秒 (设备时钟偏移已应用)。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelReading {
    /// 规范时间戳 (毫秒); 0 为 "无数据" 哨兵值
    pub timestamp_ms: i64,

    /// 通道数值
    pub values: ChannelValues,
}

impl ChannelReading {
    pub fn new(timestamp_ms: i64, values: ChannelValues) -> Self {
        Self {
            timestamp_ms,
            values,
        }
    }
}

/// 传感器事件
///
/// 从传感器回调接收的原始数据, 时间戳尚未归一化 (设备时钟纳秒)。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImuEvent {
    /// 所属通道
    pub channel: ChannelKind,

    /// 原始时间戳 (设备时钟, 纳秒)
    pub timestamp_ns: i64,

    /// 通道数值
    pub values: ChannelValues,
}
