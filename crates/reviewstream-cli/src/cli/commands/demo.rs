//! Demo command handler: producer task and consumer in one process.

use anyhow::{Context, Result};
use reviewstream_core::channel::{ChannelError, memory_channel};
use reviewstream_core::config::Config;
use reviewstream_core::generator::Generator;
use reviewstream_core::producer;
use tracing::{debug, info};

use super::GeneratorOverrides;
use crate::modes::{self, DisplayMode};

pub async fn run(
    config: &Config,
    overrides: GeneratorOverrides,
    mode: DisplayMode,
) -> Result<()> {
    let generator_config = overrides.generator_config(config);
    let mut generator =
        Generator::from_config(&generator_config).context("invalid generator settings")?;
    let producer_options = overrides.producer_options(&generator_config);

    let (mut sink, rx) = memory_channel();
    info!("starting in-process demo");

    // Dropping the sink when the task ends closes the channel, which ends
    // the consumer once it has drained every message.
    let producer = tokio::spawn(async move {
        producer::run(&mut generator, &mut sink, producer_options).await
    });

    let summary = modes::consume(rx, "memory", mode).await?;
    println!("{summary}");

    if producer.is_finished() {
        let published = producer.await.context("join producer task")?;
        check_producer(published).context("demo producer failed")?;
    } else {
        // Consumer quit first; the producer has nowhere to publish.
        producer.abort();
    }
    Ok(())
}

/// Turns the producer task's result into the command's result.
///
/// A closed channel only means the consumer quit before the producer was
/// done; any other failure fails the command.
fn check_producer(published: Result<u64>) -> Result<()> {
    match published {
        Ok(published) => {
            info!(published, "demo producer finished");
            Ok(())
        }
        Err(err) if matches!(err.downcast_ref(), Some(ChannelError::Closed { .. })) => {
            debug!("demo producer stopped after the consumer left");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use super::*;

    #[test]
    fn test_producer_outcome_ignores_closed_channel_only() {
        assert!(check_producer(Ok(12)).is_ok());

        let closed = anyhow::Error::new(ChannelError::Closed {
            target: "memory".to_string(),
        });
        assert!(check_producer(Err(closed)).is_ok());

        let err = check_producer(Err(anyhow!("serialize review message"))).unwrap_err();
        assert_eq!(err.to_string(), "serialize review message");
    }
}
