//! Publish fixed learning events to a Kafka topic, so that the services
//! consuming that topic can be checked by hand.

pub mod client;
pub mod config;
pub mod data_types;
pub mod error;
pub mod fixtures;
pub mod memory;
pub mod publisher;
pub mod sink;

pub use client::KafkaConnector;
pub use config::PublisherConfig;
pub use data_types::{LearningEvent, LearningEventType};
pub use error::{ConnectError, PublishError};
pub use memory::MemoryBroker;
pub use publisher::{run, RunError, RunReport};
pub use sink::{Connector, Delivery, EventSink};
