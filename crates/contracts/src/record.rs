//! CombinedRecord - Aligner output
//!
//! Synchronized multi-channel sample structures.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{ChannelKind, ChannelReading};

/// Combined inertial sample
///
/// One reading per tracked channel, captured the moment a full round of
/// updates completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedRecord {
    /// Primary timestamp (calibrated accelerometer clock, milliseconds)
    pub timestamp_ms: i64,

    /// Record sequence number (monotonically increasing per aligner)
    pub seq: u64,

    /// Channel samples in canonical order, restricted to the tracked set
    pub samples: Vec<ChannelSample>,

    /// Alignment metadata
    pub meta: AlignMeta,
}

impl CombinedRecord {
    /// Look up one channel's sample
    pub fn sample(&self, kind: ChannelKind) -> Option<&ChannelSample> {
        self.samples.iter().find(|sample| sample.channel == kind)
    }

    /// Channels present in this record, in layout order
    pub fn channels(&self) -> impl Iterator<Item = ChannelKind> + '_ {
        self.samples.iter().map(|sample| sample.channel)
    }
}

/// One channel's contribution to a combined record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSample {
    /// Source channel
    pub channel: ChannelKind,

    /// The buffered reading at emission time
    pub reading: ChannelReading,
}

/// Alignment metadata
///
/// Diagnostics about how the round completed. Never part of the row format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlignMeta {
    /// Per-channel skew vs the primary timestamp (channel ms - primary ms)
    pub skew_ms: HashMap<ChannelKind, i64>,

    /// Channels whose buffered reading already appeared in an earlier record
    /// (possible for non-resetting channels)
    pub reused_channels: Vec<ChannelKind>,

    /// Updates lost to overwrite-latest during this round
    pub overwritten_updates: u32,
}

/// Record column layout
///
/// Derives the CSV header from the tracked channel set. Channel order is
/// always canonical regardless of configuration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordLayout {
    channels: Vec<ChannelKind>,
}

impl RecordLayout {
    /// Build a layout from a tracked set (deduplicated, canonical order)
    pub fn new(tracked: &[ChannelKind]) -> Self {
        let channels = ChannelKind::CANONICAL
            .into_iter()
            .filter(|kind| tracked.contains(kind))
            .collect();
        Self { channels }
    }

    /// Channels in layout order
    pub fn channels(&self) -> &[ChannelKind] {
        &self.channels
    }

    /// Header line, without trailing newline
    pub fn header(&self) -> String {
        let mut columns = vec!["timestamp"];
        for kind in &self.channels {
            columns.extend_from_slice(kind.column_names());
        }
        columns.join(",")
    }

    /// Total column count including the timestamp
    pub fn column_count(&self) -> usize {
        1 + self
            .channels
            .iter()
            .map(|kind| kind.component_count())
            .sum::<usize>()
    }
}
