use async_trait::async_trait;
use bytes::Bytes;

use crate::config::PublisherConfig;
use crate::error::{ConnectError, PublishError};

/// Acknowledgement of a published message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

/// A connected handle to a broker that can publish messages.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Publish a payload to `topic`, returning once the broker has
    /// acknowledged it or the send has failed.
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<Delivery, PublishError>;

    /// Flush anything outstanding and release the underlying client.
    async fn close(self);
}

/// Produces an [`EventSink`] for a given configuration.
#[async_trait]
pub trait Connector: Send + Sync {
    type Sink: EventSink;

    async fn connect(&self, config: &PublisherConfig) -> Result<Self::Sink, ConnectError>;
}
