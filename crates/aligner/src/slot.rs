//! Latest-reading channel buffer.
//!
//! One slot per tracked channel, overwrite-latest semantics: a producer that
//! reports twice before a round completes loses the earlier value. Bounded
//! memory, no queuing of stale intermediates.

use contracts::ChannelReading;

/// Single-reading buffer for one channel
///
/// Tracks freshness for alignment readiness and consumption for stale-reuse
/// diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelSlot {
    /// Latest buffered reading, if any
    latest: Option<ChannelReading>,
    /// Updated since the last readiness reset
    fresh: bool,
    /// Buffered reading already appeared in an emitted record
    consumed: bool,
}

impl ChannelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a reading, overwriting any previous one
    ///
    /// Returns `true` when an unconsumed fresh reading was displaced, i.e. an
    /// update was lost to the current round.
    pub fn store(&mut self, reading: ChannelReading) -> bool {
        let overwrote = self.fresh && !self.consumed && self.latest.is_some();
        self.latest = Some(reading);
        self.fresh = true;
        self.consumed = false;
        overwrote
    }

    /// Readiness: fresh and carrying a nonzero timestamp
    ///
    /// Zero is the "no data yet" sentinel; a genuine reading stamped exactly
    /// zero keeps the slot unarmed until a later reading replaces it.
    pub fn is_armed(&self) -> bool {
        self.fresh
            && self
                .latest
                .map(|reading| reading.timestamp_ms != 0)
                .unwrap_or(false)
    }

    /// Latest buffered reading
    pub fn latest(&self) -> Option<&ChannelReading> {
        self.latest.as_ref()
    }

    /// Whether the buffered reading was already emitted once
    pub fn was_consumed(&self) -> bool {
        self.consumed
    }

    /// Mark the buffered reading as emitted
    pub fn mark_consumed(&mut self) {
        self.consumed = true;
    }

    /// Clear readiness while keeping the buffered value (primary channels,
    /// after emission)
    pub fn disarm(&mut self) {
        self.fresh = false;
    }

    /// Drop all state (session boundaries)
    pub fn clear(&mut self) {
        self.latest = None;
        self.fresh = false;
        self.consumed = false;
    }
}
