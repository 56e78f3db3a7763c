//! Ingestion Module
//!
//! Stream sources and the loop that feeds their messages into the order
//! write path.

mod consumer;
#[cfg(feature = "kafka")]
mod kafka;
mod source;

pub use consumer::{IngestConfig, IngestReport, IngestionLoop, RetryPolicy, StopHandle};
#[cfg(feature = "kafka")]
pub use kafka::KafkaSource;
pub use source::{ChannelSource, MessageSource};
