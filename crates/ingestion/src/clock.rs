//! Sensor clock normalization
//!
//! Sensor events carry nanosecond timestamps on the device clock. Before
//! alignment they are normalized to canonical milliseconds by applying a
//! fixed offset captured at startup. Normalizing without an offset is a
//! fatal error: a record written under the wrong clock is worse than no
//! record at all.

use contracts::{ChannelReading, ContractError, ImuEvent};

/// Device-to-canonical clock converter
///
/// canonical_ms = (timestamp_ns + offset_ns) / 1_000_000
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorClock {
    offset_ns: Option<i64>,
}

impl SensorClock {
    /// Create an uninitialized clock
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock with a known offset
    pub fn with_offset(offset_ns: i64) -> Self {
        Self {
            offset_ns: Some(offset_ns),
        }
    }

    /// Set the device clock offset
    pub fn set_offset(&mut self, offset_ns: i64) {
        self.offset_ns = Some(offset_ns);
    }

    /// Whether an offset has been captured
    pub fn is_initialized(&self) -> bool {
        self.offset_ns.is_some()
    }

    /// The captured offset, if any
    pub fn offset_ns(&self) -> Option<i64> {
        self.offset_ns
    }

    /// Normalize one event to a canonical reading
    ///
    /// Returns `ClockNotInitialized` (fatal) when no offset was captured.
    pub fn normalize(&self, event: &ImuEvent) -> Result<ChannelReading, ContractError> {
        let offset = self.offset_ns.ok_or(ContractError::ClockNotInitialized)?;
        let timestamp_ms = (event.timestamp_ns + offset) / 1_000_000;
        Ok(ChannelReading::new(timestamp_ms, event.values))
    }
}
