//! Producer loop: generate, publish, wait.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use rand::Rng;
use tracing::{info, warn};

use crate::channel::EventSink;
use crate::event::WireMessage;
use crate::generator::Generator;
use crate::interrupt;

/// Controls how long the producer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerOptions {
    /// Pause after each published message.
    pub interval: Duration,
    /// Stop after this many messages; unbounded when `None`.
    pub count: Option<u64>,
}

/// Publishes generated events to `sink` until `count` is reached or Ctrl+C.
///
/// Returns the number of messages published. Any publish failure stops the
/// loop and is returned as the error; nothing is retried or dropped.
///
/// # Errors
/// Returns the underlying [`crate::channel::ChannelError`] if a publish or
/// the final flush fails.
pub async fn run<R, S>(
    generator: &mut Generator<R>,
    sink: &mut S,
    options: ProducerOptions,
) -> Result<u64>
where
    R: Rng,
    S: EventSink,
{
    let mut published = 0u64;

    while options.count.is_none_or(|limit| published < limit) {
        if interrupt::is_interrupted() {
            warn!("producer interrupted by user");
            break;
        }

        let event = generator.next_event();
        let message = WireMessage::from_event(&event, &Local::now());
        let line = message.to_line().context("serialize review message")?;
        sink.publish(&line)?;
        published += 1;
        info!(genre = %event.genre, score = event.score, "published {line}");

        if options.count.is_some_and(|limit| published >= limit) {
            break;
        }

        tokio::select! {
            () = tokio::time::sleep(options.interval) => {}
            () = interrupt::wait_for_interrupt() => {}
        }
    }

    sink.flush()?;
    info!(published, "producer shutting down");
    Ok(published)
}
