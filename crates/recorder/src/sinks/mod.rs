//! Sink implementations

pub mod csv;
pub mod log;

pub use csv::CsvSink;
pub use log::LogSink;
