//! Kafka message source.

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaResult;
use rdkafka::Message;
use tracing::{debug, info};

use super::MessageSource;
use crate::config::Config;
use crate::error::SourceError;

/// [`MessageSource`] reading one topic as part of a consumer group.
///
/// Offsets are committed automatically by the group, so a message may be
/// delivered again after a restart or rebalance.
pub struct KafkaSource {
    consumer: StreamConsumer,
}

impl KafkaSource {
    /// Creates a consumer subscribed to `topic`.
    pub fn new(brokers: &str, group_id: &str, topic: &str) -> KafkaResult<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "true")
            .set("auto.commit.interval.ms", "5000")
            .set("fetch.min.bytes", "10000")
            .set("message.max.bytes", "10000000")
            .create()?;

        consumer.subscribe(&[topic])?;
        info!(topic, group_id, "Kafka consumer subscribed");

        Ok(Self { consumer })
    }

    /// Creates a consumer from the service configuration.
    pub fn from_config(config: &Config) -> KafkaResult<Self> {
        Self::new(
            &config.kafka_brokers,
            &config.kafka_group_id,
            &config.kafka_topic,
        )
    }
}

#[async_trait]
impl MessageSource for KafkaSource {
    async fn next_message(&mut self) -> Result<Vec<u8>, SourceError> {
        loop {
            let message = self
                .consumer
                .recv()
                .await
                .map_err(|e| SourceError::Transient(e.to_string()))?;

            match message.payload() {
                Some(payload) => return Ok(payload.to_vec()),
                None => debug!(
                    partition = message.partition(),
                    offset = message.offset(),
                    "Skipping message without payload"
                ),
            }
        }
    }
}
