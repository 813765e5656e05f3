//! Backpressure handling for the shared event channel

use std::sync::Arc;

use async_channel::{Receiver, Sender, TrySendError};
use contracts::{ChannelKind, DropPolicy, ImuEvent};
use tracing::{trace, warn};

use crate::config::IngestionMetrics;

/// Send an event, applying the configured drop policy when the queue is full
///
/// `pop_rx` is a clone of the consumer side of the same channel. Under
/// `DropOldest` one queued event is popped to make room; the popped event
/// is the drop. Either way exactly one event is counted as dropped.
#[inline]
pub fn send_event(
    tx: &Sender<ImuEvent>,
    pop_rx: &Receiver<ImuEvent>,
    event: ImuEvent,
    metrics: &Arc<IngestionMetrics>,
    channel: ChannelKind,
    drop_policy: DropPolicy,
) {
    match tx.try_send(event) {
        Ok(()) => {
            metrics.update_queue_len(tx.len());
            trace!(channel = %channel, "event sent");
        }
        Err(TrySendError::Full(event)) => {
            metrics.record_dropped();
            metrics::counter!("ingestion_events_dropped_total", "channel" => channel.as_str())
                .increment(1);
            match drop_policy {
                DropPolicy::DropNewest => {
                    trace!(channel = %channel, "event dropped (newest)");
                }
                DropPolicy::DropOldest => {
                    // Pop one slot, then retry once; the consumer may have
                    // raced us for that slot, in which case the retry drops
                    let _ = pop_rx.try_recv();
                    match tx.try_send(event) {
                        Ok(()) => trace!(channel = %channel, "event dropped (oldest)"),
                        Err(_) => trace!(channel = %channel, "event dropped (queue contended)"),
                    }
                }
            }
        }
        Err(TrySendError::Closed(_)) => {
            warn!(channel = %channel, "event channel closed");
        }
    }
}
