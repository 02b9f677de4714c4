use std::time::Duration;

pub const DEFAULT_BROKERS: &str = "localhost:9092";
pub const DEFAULT_TOPIC: &str = "learning-events";
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings for a single publishing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    /// Comma separated `host:port` bootstrap list.
    pub brokers: String,
    /// Topic every event is published to.
    pub topic: String,
    /// Pause between two consecutive events.
    pub interval: Duration,
    /// Upper bound for a single delivery, and for the final flush.
    pub message_timeout: Duration,
    /// Upper bound for establishing that a broker is reachable.
    pub connect_timeout: Duration,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            brokers: DEFAULT_BROKERS.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            interval: DEFAULT_INTERVAL,
            message_timeout: DEFAULT_MESSAGE_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl PublisherConfig {
    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            interval: Duration::ZERO,
            ..Self::default()
        }
    }
}
