//! SensorSource trait - Sensor data source abstraction
//!
//! Defines a unified interface for inertial sensor streams, decoupling adapters
//! from concrete sensor implementations. Device-backed sources and mock
//! sources are handled uniformly.

use std::sync::Arc;

use crate::{ChannelKind, ImuEvent, RateHint};

/// Sensor event callback type
///
/// When a sensor produces data, it sends `ImuEvent` through this callback.
/// Uses `Arc` to allow callback sharing across multiple contexts.
pub type ImuEventCallback = Arc<dyn Fn(ImuEvent) + Send + Sync>;

/// Sensor data source trait
///
/// Abstracts the common behavior of device-backed and mock sensor streams.
/// All sources implement this trait for use by `IngestionPipeline`.
///
/// # Design Principles
///
/// 1. **Decoupling**: Separates event generation from event consumption
/// 2. **Unified Interface**: Mock and device sources use the same API
/// 3. **Callback Pattern**: Uses callbacks instead of channels, consistent
///    with how sensor hardware delivers events
///
/// # Example
///
/// ```ignore
/// let source: Box<dyn SensorSource> = get_sensor_source();
/// source.listen(Arc::new(|event| {
///     println!("Received event on {:?}", event.channel);
/// }));
/// // ... use source ...
/// source.stop();
/// ```
pub trait SensorSource: Send + Sync {
    /// The channel this source produces
    fn channel(&self) -> ChannelKind;

    /// Requested sampling rate (registration hint, not enforced)
    fn rate(&self) -> RateHint;

    /// Register data callback
    ///
    /// When the sensor produces data, it calls the callback with one
    /// `ImuEvent`. If already listening, repeated calls are idempotent
    /// (no duplicate callbacks get registered).
    fn listen(&self, callback: ImuEventCallback);

    /// Stop listening
    ///
    /// Stops event generation. For mock sources this stops the background
    /// thread; for device sources it unregisters the hardware listener.
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}
