use std::{io::Write, time::Duration};

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};

use learning_events::{
    config::{
        DEFAULT_BROKERS, DEFAULT_CONNECT_TIMEOUT, DEFAULT_INTERVAL, DEFAULT_MESSAGE_TIMEOUT,
        DEFAULT_TOPIC,
    },
    fixtures::lesson_sequence,
    run, KafkaConnector, MemoryBroker, PublisherConfig, RunError,
};

/// Send the fixed lesson events to Kafka.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Bootstrap servers of the Kafka cluster.
    #[arg(long, env = "LEARNING_EVENTS_BROKERS", default_value = DEFAULT_BROKERS)]
    brokers: String,

    /// Topic that events are published to.
    #[arg(long, env = "LEARNING_EVENTS_TOPIC", default_value = DEFAULT_TOPIC)]
    topic: String,

    /// Pause between consecutive events, in milliseconds.
    #[arg(
        long,
        env = "LEARNING_EVENTS_INTERVAL_MS",
        default_value_t = DEFAULT_INTERVAL.as_millis() as u64
    )]
    interval_ms: u64,

    /// Delivery timeout for a single event, in milliseconds.
    #[arg(
        long,
        env = "LEARNING_EVENTS_MESSAGE_TIMEOUT_MS",
        default_value_t = DEFAULT_MESSAGE_TIMEOUT.as_millis() as u64
    )]
    message_timeout_ms: u64,

    /// How long to wait for a broker to answer, in milliseconds.
    #[arg(
        long,
        env = "LEARNING_EVENTS_CONNECT_TIMEOUT_MS",
        default_value_t = DEFAULT_CONNECT_TIMEOUT.as_millis() as u64
    )]
    connect_timeout_ms: u64,

    /// Publish to an in-process broker and print what it received.
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

impl From<&Cli> for PublisherConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            brokers: cli.brokers.clone(),
            topic: cli.topic.clone(),
            interval: Duration::from_millis(cli.interval_ms),
            message_timeout: Duration::from_millis(cli.message_timeout_ms),
            connect_timeout: Duration::from_millis(cli.connect_timeout_ms),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.verbose.tracing_level_filter())
        .with_writer(std::io::stderr)
        .init();

    let config = PublisherConfig::from(&cli);
    let events = lesson_sequence();
    let mut stdout = std::io::stdout().lock();

    let result = if cli.dry_run {
        let broker = MemoryBroker::new();
        let result = run(&broker, &config, &events, &mut stdout).await;

        writeln!(stdout)?;
        for message in broker.messages(&config.topic).unwrap_or_default() {
            writeln!(stdout, "{}: {}", config.topic, String::from_utf8_lossy(&message))?;
        }
        result
    } else {
        run(&KafkaConnector, &config, &events, &mut stdout).await
    };

    match result {
        // Connection failures are reported by `run` and end the run normally.
        Ok(_) | Err(RunError::Connect(_)) => Ok(()),
        Err(RunError::Output(e)) => Err(e.into()),
    }
}
