//! Ingestion Pipeline main entry

use std::collections::HashMap;
use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender};
use contracts::{ChannelKind, ImuEvent, SensorSource};
use tracing::{debug, info, instrument};

use crate::adapter::ChannelAdapter;
use crate::config::{BackpressureConfig, IngestionMetrics};
use crate::error::{IngestionError, Result};
use crate::generic_adapter::GenericChannelAdapter;

/// Ingestion Pipeline
///
/// Manages one adapter per tracked channel and merges all sensor callbacks
/// into a single event stream. Mock and device sources register uniformly.
pub struct IngestionPipeline {
    /// Registered adapters, one per channel
    adapters: HashMap<ChannelKind, Box<dyn ChannelAdapter>>,

    /// Shared metrics
    metrics: Arc<IngestionMetrics>,

    /// Event sender (shared by all adapters)
    tx: Sender<ImuEvent>,

    /// Event receiver handed to the consumer
    rx: Option<Receiver<ImuEvent>>,

    /// Receiver clone kept for DropOldest backpressure
    pop_rx: Receiver<ImuEvent>,

    /// Default backpressure configuration
    default_config: BackpressureConfig,
}

impl IngestionPipeline {
    /// Create new Ingestion Pipeline
    ///
    /// # Arguments
    /// * `channel_capacity` - Event channel capacity
    pub fn new(channel_capacity: usize) -> Self {
        Self::with_config(BackpressureConfig {
            channel_capacity,
            ..Default::default()
        })
    }

    /// Create with custom backpressure configuration
    pub fn with_config(config: BackpressureConfig) -> Self {
        let (tx, rx) = bounded(config.channel_capacity);
        let pop_rx = rx.clone();

        Self {
            adapters: HashMap::new(),
            metrics: Arc::new(IngestionMetrics::new()),
            tx,
            rx: Some(rx),
            pop_rx,
            default_config: config,
        }
    }

    /// Register a sensor source for its channel
    ///
    /// Each channel admits exactly one source; a second registration for the
    /// same channel is rejected.
    ///
    /// # Arguments
    /// * `source` - Data source implementing `SensorSource`
    /// * `config` - Optional backpressure configuration override
    #[instrument(
        name = "ingestion_register_source",
        skip(self, source, config),
        fields(channel = %source.channel())
    )]
    pub fn register_source(
        &mut self,
        source: Box<dyn SensorSource>,
        config: Option<BackpressureConfig>,
    ) -> Result<()> {
        let channel = source.channel();
        let rate = source.rate();

        if rate.period().is_zero() {
            return Err(IngestionError::InvalidRate {
                channel,
                message: "sampling period must be positive".to_string(),
            });
        }
        if self.adapters.contains_key(&channel) {
            return Err(IngestionError::DuplicateChannel { channel });
        }

        let adapter = GenericChannelAdapter::new(
            source,
            config.unwrap_or_else(|| self.default_config.clone()),
            self.pop_rx.clone(),
        );
        debug!(channel = %channel, rate_hz = rate.hz(), "registered sensor source");
        self.adapters.insert(channel, Box::new(adapter));
        Ok(())
    }

    /// Start all registered channels
    #[instrument(name = "ingestion_start_all", skip(self))]
    pub fn start_all(&self) {
        info!(count = self.adapters.len(), "starting all channel adapters");
        for (channel, adapter) in &self.adapters {
            self.start_adapter(*channel, adapter.as_ref());
        }
    }

    /// Stop all channels
    #[instrument(name = "ingestion_stop_all", skip(self))]
    pub fn stop_all(&self) {
        info!(count = self.adapters.len(), "stopping all channel adapters");
        for (channel, adapter) in &self.adapters {
            self.stop_adapter(*channel, adapter.as_ref());
        }
    }

    fn start_adapter(&self, channel: ChannelKind, adapter: &dyn ChannelAdapter) {
        if !adapter.is_listening() {
            debug!(channel = %channel, "starting adapter");
            adapter.start(self.tx.clone(), self.metrics.clone());
        }
    }

    fn stop_adapter(&self, channel: ChannelKind, adapter: &dyn ChannelAdapter) {
        if adapter.is_listening() {
            debug!(channel = %channel, "stopping adapter");
            adapter.stop();
        }
    }

    /// Get the merged event stream receiver
    ///
    /// Note: Can only be called once, subsequent calls return None
    pub fn take_receiver(&mut self) -> Option<Receiver<ImuEvent>> {
        self.rx.take()
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// Get registered channel count
    pub fn channel_count(&self) -> usize {
        self.adapters.len()
    }

    /// Check if the specified channel is listening
    pub fn is_channel_listening(&self, channel: ChannelKind) -> bool {
        self.adapters
            .get(&channel)
            .map(|a| a.is_listening())
            .unwrap_or(false)
    }
}

impl Drop for IngestionPipeline {
    fn drop(&mut self) {
        self.stop_all();
    }
}
