use std::io::{self, Write};

use tracing::{error, info};

use crate::config::PublisherConfig;
use crate::data_types::LearningEvent;
use crate::error::{ConnectError, PublishError};
use crate::sink::{Connector, Delivery, EventSink};

const RULE_WIDTH: usize = 50;

/// Outcome of a publishing run that managed to connect.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Acknowledgements, in the order the events were sent.
    pub sent: Vec<Delivery>,
    pub failed: usize,
}

impl RunReport {
    pub fn all_sent(&self) -> bool {
        self.failed == 0
    }
}

/// Why a run stopped early.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// The console could not be written to.
    #[error("unable to write output: {0}")]
    Output(#[from] io::Error),
}

/// Publish `events` in order to the configured topic.
///
/// A connection failure is reported to `out` and returned without anything
/// having been sent. Individual publish failures are reported and counted
/// without stopping the sequence. The sink is always closed once every
/// event has been attempted.
pub async fn run<C, W>(
    connector: &C,
    config: &PublisherConfig,
    events: &[LearningEvent],
    out: &mut W,
) -> Result<RunReport, RunError>
where
    C: Connector,
    W: Write,
{
    banner(out, "Sending test events to Kafka")?;

    let sink = match connector.connect(config).await {
        Ok(sink) => sink,
        Err(e) => {
            error!(?e, brokers = %config.brokers, "unable to connect");
            writeln!(out, "✗ Failed to connect to Kafka: {e}")?;
            writeln!(out, "Make sure Kafka is running on {}", config.brokers)?;
            return Err(e.into());
        }
    };

    let outcome = publish_all(&sink, config, events, out).await;
    sink.close().await;
    let report = outcome?;

    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    if report.all_sent() {
        writeln!(out, "Events sent successfully!")?;
    } else {
        writeln!(
            out,
            "{} of {} events sent, {} failed.",
            report.sent.len(),
            events.len(),
            report.failed
        )?;
    }
    writeln!(
        out,
        "Wait a few seconds for the Analytics Service to process them."
    )?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;

    info!(
        topic = %config.topic,
        sent = report.sent.len(),
        failed = report.failed,
        "run complete"
    );
    Ok(report)
}

async fn publish_all<S, W>(
    sink: &S,
    config: &PublisherConfig,
    events: &[LearningEvent],
    out: &mut W,
) -> Result<RunReport, io::Error>
where
    S: EventSink,
    W: Write,
{
    let mut report = RunReport::default();

    for (i, event) in events.iter().enumerate() {
        if i > 0 && !config.interval.is_zero() {
            tokio::time::sleep(config.interval).await;
        }

        let event_type = event.event_type();
        writeln!(out)?;
        writeln!(out, "[{}] Sending {event_type} event...", i + 1)?;

        match publish_one(sink, &config.topic, event).await {
            Ok(delivery) => {
                info!(
                    %event_type,
                    topic = %delivery.topic,
                    partition = delivery.partition,
                    offset = delivery.offset,
                    "event sent"
                );
                writeln!(out, "✓ Sent event: {event_type}")?;
                report.sent.push(delivery);
            }
            Err(e) => {
                error!(?e, %event_type, "unable to send event");
                writeln!(out, "✗ Failed to send event: {e}")?;
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

async fn publish_one<S: EventSink>(
    sink: &S,
    topic: &str,
    event: &LearningEvent,
) -> Result<Delivery, PublishError> {
    let payload = event.to_payload()?;
    sink.publish(topic, payload).await
}

fn banner<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;
    use serde_json::Value;

    use super::{run, RunError};
    use crate::config::PublisherConfig;
    use crate::error::ConnectError;
    use crate::fixtures::lesson_sequence;
    use crate::memory::MemoryBroker;

    fn published(broker: &MemoryBroker, topic: &str) -> Vec<Value> {
        broker
            .messages(topic)
            .unwrap_or_default()
            .iter()
            .map(|m| serde_json::from_slice(m).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn publishes_sequence_in_order() {
        let broker = MemoryBroker::new();
        let config = PublisherConfig::test_config();
        let mut out = Vec::new();

        let report = run(&broker, &config, &lesson_sequence(), &mut out)
            .await
            .unwrap();
        assert!(report.all_sent());
        assert_eq!(
            report.sent.iter().map(|d| d.offset).collect::<Vec<_>>(),
            [0, 1]
        );

        let messages = published(&broker, "learning-events");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["eventType"], "LESSON_STARTED");
        assert_eq!(messages[1]["eventType"], "LESSON_COMPLETED");
        for message in &messages {
            assert_eq!(message.as_object().unwrap().len(), 6);
        }
        assert_eq!(broker.topics(), vec!["learning-events".to_string()]);
        assert_eq!(broker.closed_sinks(), 1);

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("[1] Sending LESSON_STARTED event..."));
        assert!(out.contains("✓ Sent event: LESSON_STARTED"));
        assert!(out.contains("[2] Sending LESSON_COMPLETED event..."));
        assert!(out.contains("✓ Sent event: LESSON_COMPLETED"));
        assert!(out.contains("Events sent successfully!"));
    }

    #[tokio::test]
    async fn unreachable_broker_publishes_nothing() {
        let broker = MemoryBroker::offline();
        let config = PublisherConfig::test_config();
        let mut out = Vec::new();

        let result = run(&broker, &config, &lesson_sequence(), &mut out).await;
        assert_matches!(result, Err(RunError::Connect(ConnectError::Offline { .. })));

        assert_eq!(broker.attempts(), 0);
        assert!(broker.topics().is_empty());

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("✗ Failed to connect to Kafka"));
        assert!(out.contains("Make sure Kafka is running on localhost:9092"));
        assert!(!out.contains("Sending LESSON_STARTED"));
    }

    #[tokio::test]
    async fn failed_send_does_not_abort_sequence() {
        let broker = MemoryBroker::new();
        broker.reject_attempt(0);
        let config = PublisherConfig::test_config();
        let mut out = Vec::new();

        let report = run(&broker, &config, &lesson_sequence(), &mut out)
            .await
            .unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.sent.len(), 1);
        assert!(!report.all_sent());

        let messages = published(&broker, "learning-events");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["eventType"], "LESSON_COMPLETED");
        assert_eq!(broker.closed_sinks(), 1, "sink is closed despite the failure");

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("✗ Failed to send event: broker rejected message"));
        assert!(out.contains("✓ Sent event: LESSON_COMPLETED"));
        assert!(out.contains("1 of 2 events sent, 1 failed."));
    }

    #[tokio::test]
    async fn rerun_appends_without_deduplication() {
        let broker = MemoryBroker::new();
        let config = PublisherConfig::test_config();

        for _ in 0..2 {
            run(&broker, &config, &lesson_sequence(), &mut std::io::sink())
                .await
                .unwrap();
        }

        let types = published(&broker, "learning-events")
            .iter()
            .map(|m| m["eventType"].as_str().unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            types,
            [
                "LESSON_STARTED",
                "LESSON_COMPLETED",
                "LESSON_STARTED",
                "LESSON_COMPLETED"
            ]
        );
        assert_eq!(broker.closed_sinks(), 2);
    }

    #[tokio::test]
    async fn publishes_to_configured_topic() {
        let broker = MemoryBroker::new();
        let config = PublisherConfig {
            topic: "custom".to_string(),
            ..PublisherConfig::test_config()
        };

        run(&broker, &config, &lesson_sequence(), &mut std::io::sink())
            .await
            .unwrap();

        assert_eq!(broker.topics(), vec!["custom".to_string()]);
        assert_eq!(published(&broker, "custom").len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_interval_between_events() {
        let broker = MemoryBroker::new();
        let config = PublisherConfig {
            interval: std::time::Duration::from_secs(1),
            ..PublisherConfig::test_config()
        };

        let start = tokio::time::Instant::now();
        run(&broker, &config, &lesson_sequence(), &mut std::io::sink())
            .await
            .unwrap();

        // Only one gap for two events.
        assert_eq!(start.elapsed().as_secs(), 1);
    }
}
