//! Main sample aligner implementation.

use std::collections::HashMap;

use contracts::{
    AlignMeta, AlignerConfig, ChannelKind, ChannelReading, ChannelSample, CombinedRecord,
    RecordLayout,
};
use tracing::instrument;

use crate::gravity::GravityFilter;
use crate::slot::ChannelSlot;

/// Aligner state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlignState {
    /// No readings buffered
    Idle,
    /// Collecting updates, waiting for a complete round
    Filling,
    /// All tracked channels armed, next emit succeeds
    Ready,
}

/// Multi-channel sample aligner
///
/// Event-driven fan-in: one `push` per sensor event, one record out per
/// complete round of updates (one fresh update per tracked channel). No
/// timeouts, no partial records; a missing channel simply defers emission.
///
/// Store, readiness check and reset run under `&mut self` and therefore form
/// one critical section; callers that share an aligner across tasks must wrap
/// it in a mutex to keep that guarantee.
#[derive(Debug)]
pub struct SampleAligner {
    /// Configuration
    config: AlignerConfig,
    /// Tracked channels in canonical order
    layout: RecordLayout,
    /// Per-channel latest-reading slots
    slots: HashMap<ChannelKind, ChannelSlot>,
    /// Per-channel gravity filters (accelerometer channels only)
    gravity: HashMap<ChannelKind, GravityFilter>,
    /// Current state
    state: AlignState,
    /// Emitted record counter
    record_counter: u64,
    /// Updates lost to overwrite since the last emission
    round_overwrites: u32,
    /// Primary timestamp of the last emitted record
    last_emit_ms: Option<i64>,
}

impl SampleAligner {
    /// Create a new aligner for the configured channel set
    pub fn new(config: AlignerConfig) -> Self {
        let layout = config.layout();
        let mut slots = HashMap::new();
        let mut gravity = HashMap::new();

        for kind in layout.channels() {
            slots.insert(*kind, ChannelSlot::new());
            if kind.is_accelerometer() {
                gravity.insert(*kind, GravityFilter::new());
            }
        }

        Self {
            config,
            layout,
            slots,
            gravity,
            state: AlignState::Idle,
            record_counter: 0,
            round_overwrites: 0,
            last_emit_ms: None,
        }
    }

    /// Push one normalized reading into the aligner
    ///
    /// Returns `Some(CombinedRecord)` when this update completes a round.
    /// Updates for untracked channels and readings whose payload shape does
    /// not match the channel are ignored.
    #[instrument(
        level = "trace",
        name = "aligner_push",
        skip(self, reading),
        fields(channel = %channel, timestamp_ms = reading.timestamp_ms)
    )]
    pub fn push(
        &mut self,
        channel: ChannelKind,
        reading: ChannelReading,
    ) -> Option<CombinedRecord> {
        if !self.config.is_tracked(channel) {
            // expected for hosts that register more sensors than they track
            tracing::trace!(channel = %channel, "update for untracked channel ignored");
            metrics::counter!("align_untracked_updates_total").increment(1);
            return None;
        }

        if !reading.values.matches(channel) {
            tracing::warn!(channel = %channel, "payload shape mismatch, reading dropped");
            metrics::counter!("align_shape_mismatch_total", "channel" => channel.as_str())
                .increment(1);
            return None;
        }

        let reading = self.compensate(channel, reading);

        if let Some(slot) = self.slots.get_mut(&channel) {
            if slot.store(reading) {
                self.round_overwrites += 1;
                metrics::counter!("align_overwritten_updates_total", "channel" => channel.as_str())
                    .increment(1);
            }
        }

        self.update_state();

        self.try_emit()
    }

    /// Clear buffered readings and readiness for all channels
    ///
    /// Used at session boundaries. Gravity estimates persist; they belong to
    /// the filter instances, not to the round.
    pub fn reset(&mut self) {
        for slot in self.slots.values_mut() {
            slot.clear();
        }
        self.round_overwrites = 0;
        self.state = AlignState::Idle;
    }

    /// Number of records emitted so far
    pub fn record_count(&self) -> u64 {
        self.record_counter
    }

    /// Tracked channels in canonical order
    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Channels the current round is still waiting on
    pub fn pending_channels(&self) -> Vec<ChannelKind> {
        self.layout
            .channels()
            .iter()
            .filter(|kind| {
                self.slots
                    .get(kind)
                    .map(|slot| !slot.is_armed())
                    .unwrap_or(true)
            })
            .copied()
            .collect()
    }

    /// Apply gravity compensation on accelerometer channels before storing
    ///
    /// Runs on every update, including ones whose round never completes; the
    /// filter state must track the full input stream.
    fn compensate(&mut self, channel: ChannelKind, reading: ChannelReading) -> ChannelReading {
        let Some(filter) = self.gravity.get_mut(&channel) else {
            return reading;
        };

        let linear = filter.apply(reading.values.axes());
        ChannelReading::new(reading.timestamp_ms, reading.values.with_axes(linear))
    }

    /// Update internal state based on slot contents
    fn update_state(&mut self) {
        if self.all_slots_empty() {
            self.state = AlignState::Idle;
        } else if self.all_channels_armed() {
            self.state = AlignState::Ready;
        } else {
            self.state = AlignState::Filling;
        }
    }

    fn all_slots_empty(&self) -> bool {
        self.slots.values().all(|slot| slot.latest().is_none())
    }

    fn all_channels_armed(&self) -> bool {
        self.layout.channels().iter().all(|kind| {
            self.slots
                .get(kind)
                .map(|slot| slot.is_armed())
                .unwrap_or(false)
        })
    }

    /// Try to emit a combined record
    #[instrument(name = "aligner_try_emit", level = "trace", skip(self))]
    fn try_emit(&mut self) -> Option<CombinedRecord> {
        if self.state != AlignState::Ready {
            return None;
        }

        let timestamp_ms = self.primary_timestamp()?;
        let mut samples = Vec::with_capacity(self.layout.channels().len());
        let mut meta = AlignMeta {
            overwritten_updates: self.round_overwrites,
            ..AlignMeta::default()
        };

        for kind in self.layout.channels() {
            let slot = self.slots.get_mut(kind)?;
            let reading = *slot.latest()?;
            if slot.was_consumed() {
                meta.reused_channels.push(*kind);
            }
            slot.mark_consumed();
            meta.skew_ms.insert(*kind, reading.timestamp_ms - timestamp_ms);
            samples.push(ChannelSample {
                channel: *kind,
                reading,
            });
        }

        self.record_counter += 1;
        let record = CombinedRecord {
            timestamp_ms,
            seq: self.record_counter,
            samples,
            meta,
        };

        // Only the primary channels lose readiness; non-resetting channels
        // stay armed with their buffered value until overwritten.
        for kind in self.config.primary_channels().collect::<Vec<_>>() {
            if let Some(slot) = self.slots.get_mut(&kind) {
                slot.disarm();
            }
        }

        self.round_overwrites = 0;
        self.record_emit_metrics(&record);
        self.update_state();

        Some(record)
    }

    /// Timestamp convention: the calibrated accelerometer stamps the record
    fn primary_timestamp(&self) -> Option<i64> {
        self.slots
            .get(&ChannelKind::Accel)
            .and_then(|slot| slot.latest())
            .map(|reading| reading.timestamp_ms)
    }

    fn record_emit_metrics(&mut self, record: &CombinedRecord) {
        metrics::counter!("align_records_total", "status" => "ok").increment(1);

        if let Some(last_ms) = self.last_emit_ms {
            let interval = (record.timestamp_ms - last_ms).unsigned_abs();
            metrics::histogram!("align_emit_interval_ms").record(interval as f64);
        }
        self.last_emit_ms = Some(record.timestamp_ms);

        for (kind, skew) in &record.meta.skew_ms {
            metrics::histogram!("align_round_skew_ms", "channel" => kind.as_str())
                .record(skew.unsigned_abs() as f64);
        }

        for kind in &record.meta.reused_channels {
            metrics::counter!("align_reused_readings_total", "channel" => kind.as_str())
                .increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ChannelValues, UncalibratedTriad, Vector3};

    fn triaxial(timestamp_ms: i64, x: f32, y: f32, z: f32) -> ChannelReading {
        ChannelReading::new(timestamp_ms, ChannelValues::Triaxial(Vector3::new(x, y, z)))
    }

    fn uncalibrated(timestamp_ms: i64, x: f32, y: f32, z: f32) -> ChannelReading {
        ChannelReading::new(
            timestamp_ms,
            ChannelValues::Uncalibrated(UncalibratedTriad {
                axes: Vector3::new(x, y, z),
                bias: Vector3::new(0.1, 0.2, 0.3),
            }),
        )
    }

    fn default_aligner() -> SampleAligner {
        SampleAligner::new(AlignerConfig::default())
    }

    fn feed_round(aligner: &mut SampleAligner, timestamp_ms: i64) -> Option<CombinedRecord> {
        aligner.push(ChannelKind::Accel, triaxial(timestamp_ms, 1.0, 2.0, 3.0));
        aligner.push(ChannelKind::Gyro, triaxial(timestamp_ms, 4.0, 5.0, 6.0));
        aligner.push(
            ChannelKind::GyroUncalibrated,
            uncalibrated(timestamp_ms, 7.0, 8.0, 9.0),
        )
    }

    #[test]
    fn no_emission_for_partial_round() {
        let mut aligner = default_aligner();

        assert!(aligner
            .push(ChannelKind::Accel, triaxial(100, 1.0, 2.0, 3.0))
            .is_none());
        assert!(aligner
            .push(ChannelKind::Gyro, triaxial(100, 4.0, 5.0, 6.0))
            .is_none());
        assert_eq!(aligner.record_count(), 0);
        assert_eq!(
            aligner.pending_channels(),
            vec![ChannelKind::GyroUncalibrated]
        );
    }

    #[test]
    fn complete_round_emits_exactly_one_record() {
        let mut aligner = default_aligner();

        let record = feed_round(&mut aligner, 100).expect("complete round must emit");
        assert_eq!(record.timestamp_ms, 100);
        assert_eq!(record.seq, 1);
        assert_eq!(
            record.channels().collect::<Vec<_>>(),
            vec![
                ChannelKind::Accel,
                ChannelKind::Gyro,
                ChannelKind::GyroUncalibrated
            ]
        );
        assert_eq!(aligner.record_count(), 1);
    }

    #[test]
    fn gravity_compensation_applied_on_first_round() {
        let mut aligner = default_aligner();

        let record = feed_round(&mut aligner, 100).unwrap();
        let accel = record.sample(ChannelKind::Accel).unwrap().reading;
        let axes = accel.values.axes();

        // zero-initialized estimate: first output is α·raw
        assert!((axes.x - 0.95).abs() < 1e-5);
        assert!((axes.y - 1.9).abs() < 1e-5);
        assert!((axes.z - 2.85).abs() < 1e-5);

        // gyro passes through untouched
        let gyro = record.sample(ChannelKind::Gyro).unwrap().reading;
        assert_eq!(gyro.values.axes(), Vector3::new(4.0, 5.0, 6.0));

        // uncalibrated gyro keeps its bias estimate
        let uncal = record.sample(ChannelKind::GyroUncalibrated).unwrap().reading;
        assert_eq!(uncal.values.bias(), Some(Vector3::new(0.1, 0.2, 0.3)));
    }

    #[test]
    fn no_duplicate_emission_without_fresh_primaries() {
        let mut aligner = default_aligner();
        feed_round(&mut aligner, 100).unwrap();

        // the uncalibrated channel alone cannot re-trigger: both primaries
        // were disarmed by the emission
        assert!(aligner
            .push(ChannelKind::GyroUncalibrated, uncalibrated(101, 7.0, 8.0, 9.0))
            .is_none());
        assert!(aligner
            .push(ChannelKind::Accel, triaxial(102, 1.0, 2.0, 3.0))
            .is_none());
        let record = aligner
            .push(ChannelKind::Gyro, triaxial(102, 4.0, 5.0, 6.0))
            .expect("fresh primaries complete the round");
        assert_eq!(record.seq, 2);
        assert_eq!(record.timestamp_ms, 102);
    }

    #[test]
    fn stale_uncalibrated_reading_is_reused_and_reported() {
        let mut aligner = default_aligner();
        feed_round(&mut aligner, 100).unwrap();

        // second round completed by the primaries only
        aligner.push(ChannelKind::Accel, triaxial(110, 1.0, 2.0, 3.0));
        let record = aligner
            .push(ChannelKind::Gyro, triaxial(110, 4.0, 5.0, 6.0))
            .expect("uncalibrated slot is still armed from round one");

        let uncal = record.sample(ChannelKind::GyroUncalibrated).unwrap().reading;
        assert_eq!(uncal.timestamp_ms, 100);
        assert_eq!(record.meta.reused_channels, vec![ChannelKind::GyroUncalibrated]);
        assert_eq!(record.meta.skew_ms[&ChannelKind::GyroUncalibrated], -10);
    }

    #[test]
    fn zero_timestamp_defers_emission() {
        let mut aligner = default_aligner();

        aligner.push(ChannelKind::Accel, triaxial(0, 1.0, 2.0, 3.0));
        aligner.push(ChannelKind::Gyro, triaxial(100, 4.0, 5.0, 6.0));
        assert!(aligner
            .push(ChannelKind::GyroUncalibrated, uncalibrated(100, 7.0, 8.0, 9.0))
            .is_none());

        let record = aligner
            .push(ChannelKind::Accel, triaxial(101, 1.0, 2.0, 3.0))
            .expect("nonzero accel timestamp arms the round");
        assert_eq!(record.timestamp_ms, 101);
    }

    #[test]
    fn overwrite_latest_drops_the_intermediate_value() {
        let mut aligner = default_aligner();

        aligner.push(ChannelKind::Accel, triaxial(100, 1.0, 2.0, 3.0));
        aligner.push(ChannelKind::Accel, triaxial(101, 9.0, 9.0, 9.0));
        aligner.push(ChannelKind::Gyro, triaxial(101, 4.0, 5.0, 6.0));
        let record = aligner
            .push(ChannelKind::GyroUncalibrated, uncalibrated(101, 7.0, 8.0, 9.0))
            .unwrap();

        assert_eq!(record.timestamp_ms, 101);
        assert_eq!(record.meta.overwritten_updates, 1);

        // the counter is per round
        let record = feed_round(&mut aligner, 102).unwrap();
        assert_eq!(record.meta.overwritten_updates, 0);
    }

    #[test]
    fn untracked_channel_is_ignored() {
        let mut aligner = default_aligner();

        assert!(aligner
            .push(
                ChannelKind::AccelUncalibrated,
                uncalibrated(100, 1.0, 2.0, 3.0)
            )
            .is_none());

        let record = feed_round(&mut aligner, 100).unwrap();
        assert_eq!(record.samples.len(), 3);
        assert!(record.sample(ChannelKind::AccelUncalibrated).is_none());
    }

    #[test]
    fn shape_mismatch_is_dropped() {
        let mut aligner = default_aligner();

        // triaxial payload on a six-component channel
        assert!(aligner
            .push(ChannelKind::GyroUncalibrated, triaxial(100, 7.0, 8.0, 9.0))
            .is_none());
        assert!(aligner
            .pending_channels()
            .contains(&ChannelKind::GyroUncalibrated));
    }

    #[test]
    fn four_channel_configuration_uses_independent_filters() {
        let mut aligner = SampleAligner::new(AlignerConfig::with_channels(vec![
            ChannelKind::Accel,
            ChannelKind::AccelUncalibrated,
            ChannelKind::Gyro,
            ChannelKind::GyroUncalibrated,
        ]));

        aligner.push(ChannelKind::Accel, triaxial(100, 1.0, 0.0, 0.0));
        aligner.push(
            ChannelKind::AccelUncalibrated,
            uncalibrated(100, 2.0, 0.0, 0.0),
        );
        aligner.push(ChannelKind::Gyro, triaxial(100, 0.0, 0.0, 0.0));
        let record = aligner
            .push(
                ChannelKind::GyroUncalibrated,
                uncalibrated(100, 0.0, 0.0, 0.0),
            )
            .unwrap();

        let accel = record.sample(ChannelKind::Accel).unwrap().reading;
        let accel_uncal = record
            .sample(ChannelKind::AccelUncalibrated)
            .unwrap()
            .reading;
        assert!((accel.values.axes().x - 0.95).abs() < 1e-5);
        // separate instance, same first-application scaling on its own input
        assert!((accel_uncal.values.axes().x - 1.9).abs() < 1e-5);
        assert_eq!(accel_uncal.values.bias(), Some(Vector3::new(0.1, 0.2, 0.3)));
    }

    #[test]
    fn reset_clears_rounds_but_keeps_gravity_state() {
        let mut aligner = default_aligner();
        aligner.push(ChannelKind::Accel, triaxial(100, 1.0, 2.0, 3.0));
        aligner.push(ChannelKind::Gyro, triaxial(100, 4.0, 5.0, 6.0));

        aligner.reset();
        assert!(aligner
            .push(ChannelKind::GyroUncalibrated, uncalibrated(101, 7.0, 8.0, 9.0))
            .is_none());

        let record = {
            aligner.push(ChannelKind::Accel, triaxial(102, 1.0, 2.0, 3.0));
            aligner
                .push(ChannelKind::Gyro, triaxial(102, 4.0, 5.0, 6.0))
                .expect("fresh round after reset emits")
        };

        // second filter application: g = (1-α²)·raw, linear = α²·raw
        let axes = record.sample(ChannelKind::Accel).unwrap().reading.values.axes();
        let alpha_sq = crate::gravity::GRAVITY_ALPHA * crate::gravity::GRAVITY_ALPHA;
        assert!((axes.x - alpha_sq).abs() < 1e-5);
        assert!((axes.y - 2.0 * alpha_sq).abs() < 1e-5);
    }

    #[test]
    fn randomized_interleavings_emit_once_per_round() {
        use rand::seq::SliceRandom;

        let mut rng = rand::rng();
        let mut aligner = default_aligner();
        let mut channels = [
            ChannelKind::Accel,
            ChannelKind::Gyro,
            ChannelKind::GyroUncalibrated,
        ];

        for round in 0..50i64 {
            channels.shuffle(&mut rng);
            let timestamp = 100 + round;
            let mut emitted = 0;
            for kind in channels {
                let reading = match kind {
                    ChannelKind::GyroUncalibrated => uncalibrated(timestamp, 7.0, 8.0, 9.0),
                    _ => triaxial(timestamp, 1.0, 2.0, 3.0),
                };
                if aligner.push(kind, reading).is_some() {
                    emitted += 1;
                }
            }
            assert_eq!(emitted, 1, "round {round} emitted {emitted} records");
        }
        assert_eq!(aligner.record_count(), 50);
    }
}
