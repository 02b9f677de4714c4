use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use bytes::Bytes;
use hashbrown::{HashMap, HashSet};
use parking_lot::Mutex;
use tracing::debug;

use crate::config::PublisherConfig;
use crate::error::{ConnectError, PublishError};
use crate::sink::{Connector, Delivery, EventSink};

/// An in-process, append-only broker.
///
/// Messages are held in the order they are received, partitioned by
/// topic. Clones share the same underlying store, so a sink obtained
/// through [`Connector::connect`] writes into the broker it came from.
///
/// Every message lands in partition 0, at an offset equal to its index
/// in the topic.
#[derive(Debug, Clone, Default)]
pub struct MemoryBroker {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    topics: Mutex<HashMap<String, Vec<Bytes>>>,
    offline: AtomicBool,
    /// Number of publish attempts seen so far, across all topics.
    attempts: AtomicUsize,
    /// Publish attempts that are refused by the broker.
    rejected_attempts: Mutex<HashSet<usize>>,
    closed_sinks: AtomicUsize,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A broker that refuses every connection.
    pub fn offline() -> Self {
        let broker = Self::new();
        broker.inner.offline.store(true, Ordering::Release);
        broker
    }

    /// Refuse the publish attempt with the given zero-based index.
    pub fn reject_attempt(&self, attempt: usize) -> &Self {
        self.inner.rejected_attempts.lock().insert(attempt);
        self
    }

    /// Messages for a particular topic, returning [`None`] if nothing was
    /// ever published to it.
    pub fn messages(&self, topic: &str) -> Option<Vec<Bytes>> {
        self.inner
            .topics
            .lock()
            .get(topic)
            .map(|messages| messages.to_vec())
    }

    /// Names of every topic holding at least one message.
    pub fn topics(&self) -> Vec<String> {
        let mut topics = self.inner.topics.lock().keys().cloned().collect::<Vec<_>>();
        topics.sort_unstable();
        topics
    }

    /// Total number of publish attempts, successful or not.
    pub fn attempts(&self) -> usize {
        self.inner.attempts.load(Ordering::Acquire)
    }

    /// Number of sinks that have been closed.
    pub fn closed_sinks(&self) -> usize {
        self.inner.closed_sinks.load(Ordering::Acquire)
    }

    fn append(&self, topic: &str, payload: Bytes) -> Result<Delivery, PublishError> {
        let attempt = self.inner.attempts.fetch_add(1, Ordering::AcqRel);
        if self.inner.rejected_attempts.lock().contains(&attempt) {
            return Err(PublishError::Rejected {
                topic: topic.to_string(),
            });
        }

        let mut topics = self.inner.topics.lock();
        let messages = topics.entry(topic.to_string()).or_default();
        messages.push(payload);

        Ok(Delivery {
            topic: topic.to_string(),
            partition: 0,
            offset: (messages.len() - 1) as i64,
        })
    }
}

#[async_trait]
impl Connector for MemoryBroker {
    type Sink = MemorySink;

    async fn connect(&self, config: &PublisherConfig) -> Result<MemorySink, ConnectError> {
        if self.inner.offline.load(Ordering::Acquire) {
            return Err(ConnectError::Offline {
                brokers: config.brokers.clone(),
            });
        }
        Ok(MemorySink {
            broker: self.clone(),
        })
    }
}

/// A connected handle onto a [`MemoryBroker`].
#[derive(Debug)]
pub struct MemorySink {
    broker: MemoryBroker,
}

#[async_trait]
impl EventSink for MemorySink {
    async fn publish(&self, topic: &str, payload: Bytes) -> Result<Delivery, PublishError> {
        let delivery = self.broker.append(topic, payload)?;
        debug!(topic, offset = delivery.offset, "appended to memory broker");
        Ok(delivery)
    }

    async fn close(self) {
        self.broker
            .inner
            .closed_sinks
            .fetch_add(1, Ordering::AcqRel);
    }
}
