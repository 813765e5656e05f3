//! Aligner configuration contracts shared across crates.

use serde::{Deserialize, Serialize};

use crate::{ChannelKind, RecordLayout};

/// Sample aligner configuration
///
/// Alignment requires one fresh update per tracked channel. Order does not
/// matter here; emitted records always follow the canonical channel order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignerConfig {
    /// Tracked channel set (2-4 channels, calibrated accelerometer required)
    pub channels: Vec<ChannelKind>,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            channels: vec![
                ChannelKind::Accel,
                ChannelKind::Gyro,
                ChannelKind::GyroUncalibrated,
            ],
        }
    }
}

impl AlignerConfig {
    /// Build a config tracking the given channels
    pub fn with_channels(channels: impl Into<Vec<ChannelKind>>) -> Self {
        Self {
            channels: channels.into(),
        }
    }

    /// Column layout induced by the tracked set
    pub fn layout(&self) -> RecordLayout {
        RecordLayout::new(&self.channels)
    }

    /// Whether a channel participates in alignment
    pub fn is_tracked(&self, kind: ChannelKind) -> bool {
        self.channels.contains(&kind)
    }

    /// Tracked channels whose readiness is cleared on emission
    pub fn primary_channels(&self) -> impl Iterator<Item = ChannelKind> + '_ {
        ChannelKind::CANONICAL
            .into_iter()
            .filter(|kind| kind.is_primary() && self.is_tracked(*kind))
    }
}
