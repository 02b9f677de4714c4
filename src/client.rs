use std::{fmt, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use rdkafka::{
    error::KafkaResult,
    producer::{FutureProducer, FutureRecord, Producer},
    ClientConfig,
};
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::config::PublisherConfig;
use crate::error::{ConnectError, PublishError};
use crate::sink::{Connector, Delivery, EventSink};

/// Connects to a Kafka cluster through librdkafka.
#[derive(Debug, Default, Clone, Copy)]
pub struct KafkaConnector;

#[async_trait]
impl Connector for KafkaConnector {
    type Sink = KafkaSink;

    /// Create a producer and confirm that a broker answers.
    ///
    /// librdkafka connects lazily, so a cluster-wide metadata request
    /// stands in for connection establishment.
    async fn connect(&self, config: &PublisherConfig) -> Result<KafkaSink, ConnectError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set(
                "message.timeout.ms",
                config.message_timeout.as_millis().to_string(),
            )
            .create()
            .map_err(ConnectError::Create)?;

        let broker_count = reachable_brokers(&producer, config.connect_timeout)
            .await?
            .map_err(|source| ConnectError::Unreachable {
                brokers: config.brokers.clone(),
                source,
            })?;

        info!(brokers = %config.brokers, broker_count, "connected to kafka");

        Ok(KafkaSink {
            producer,
            flush_timeout: config.message_timeout,
        })
    }
}

/// Number of brokers answering a metadata request for the whole cluster.
///
/// No topic is named, so brokers with `auto.create.topics.enable` do not
/// create one as a side effect.
async fn reachable_brokers(
    producer: &FutureProducer,
    timeout: Duration,
) -> Result<KafkaResult<usize>, JoinError> {
    let probe = producer.clone();
    tokio::task::spawn_blocking(move || {
        probe
            .client()
            .fetch_metadata(None, timeout)
            .map(|metadata| metadata.brokers().len())
    })
    .await
}

/// A connected Kafka producer.
pub struct KafkaSink {
    producer: FutureProducer,
    flush_timeout: Duration,
}

impl fmt::Debug for KafkaSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KafkaSink")
            .field("flush_timeout", &self.flush_timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EventSink for KafkaSink {
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<Delivery, PublishError> {
        let record = FutureRecord::<(), [u8]>::to(topic).payload(&payload[..]);

        // Bounds waiting for local queue space only. Delivery is bounded
        // by `message.timeout.ms`.
        let (partition, offset) = self
            .producer
            .send(record, self.flush_timeout)
            .await
            .map_err(|(kafka_error, _)| PublishError::Kafka(kafka_error))?;

        debug!(topic, partition, offset, "delivery acknowledged");
        Ok(Delivery {
            topic: topic.to_string(),
            partition,
            offset,
        })
    }

    async fn close(self) {
        let KafkaSink {
            producer,
            flush_timeout,
        } = self;

        let flushed = tokio::task::spawn_blocking(move || producer.flush(flush_timeout)).await;
        match flushed {
            Ok(Ok(())) => debug!("producer flushed"),
            Ok(Err(e)) => warn!(?e, "producer flush failed"),
            Err(e) => warn!(?e, "producer flush did not complete"),
        }
    }
}
