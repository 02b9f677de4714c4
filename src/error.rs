use rdkafka::error::KafkaError;

/// Failure to obtain a connected sink. Fatal for a run.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("unable to create producer: {0}")]
    Create(#[source] KafkaError),

    #[error("no brokers available at {brokers}: {source}")]
    Unreachable {
        brokers: String,
        #[source]
        source: KafkaError,
    },

    #[error("broker at {brokers} is offline")]
    Offline { brokers: String },

    #[error("connection probe did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Failure to publish a single event. Recovered by the caller.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("unable to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("delivery failed: {0}")]
    Kafka(#[from] KafkaError),

    #[error("broker rejected message for topic {topic}")]
    Rejected { topic: String },
}
