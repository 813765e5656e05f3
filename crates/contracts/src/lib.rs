//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Sensors deliver nanosecond timestamps on the device clock
//! - The pipeline normalizes them to canonical milliseconds (i64) before
//!   alignment; 0 doubles as the "no data yet" sentinel

mod aligner_config;
mod blueprint;
mod channel;
mod error;
mod record;
mod sensor_source;
mod sink;

pub use aligner_config::*;
pub use blueprint::*;
pub use channel::*;
pub use error::*;
pub use record::*;
pub use sensor_source::{ImuEventCallback, SensorSource};
pub use sink::*;
