//! Message channels between producer and consumer.
//!
//! A channel carries one NDJSON message per line, in order. Three transports
//! exist:
//!
//! - `stdio`: the producer writes to stdout, the consumer reads stdin, so
//!   `reviewstream produce --output - | reviewstream consume --input -` works
//! - `file`: an append-only NDJSON file; the consumer can follow it like
//!   `tail -f`
//! - `memory`: an in-process tokio channel used by `reviewstream demo`
//!
//! Readers run as a tokio task that only forwards raw lines; decoding and
//! aggregation stay on the consumer loop.

mod sink;
mod source;

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::mpsc;

pub use sink::{EventSink, MemorySink, NdjsonSink};
pub use source::{SourceOptions, open_source};

/// What a channel reader hands to the consumer: a raw line, or the error
/// that ended the channel.
pub type Delivery = Result<String, ChannelError>;

/// Consumer end of a channel. `None` from `recv` means end of stream.
pub type LineReceiver = mpsc::UnboundedReceiver<Delivery>;

/// Where a channel lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSpec {
    /// stdin for consumers, stdout for producers.
    Stdio,
    /// NDJSON file.
    File(PathBuf),
}

impl ChannelSpec {
    /// `-` selects stdio; anything else is a file path.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "-" => ChannelSpec::Stdio,
            path => ChannelSpec::File(PathBuf::from(path)),
        }
    }
}

impl fmt::Display for ChannelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelSpec::Stdio => f.write_str("stdio"),
            ChannelSpec::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A channel could not be opened, read, or written.
///
/// Always fatal for the side that hits it.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel {target} is unavailable: {source}")]
    Open {
        target: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to read from channel {target}: {source}")]
    Read {
        target: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to publish to channel {target}: {source}")]
    Write {
        target: String,
        #[source]
        source: io::Error,
    },
    #[error("channel {target} was closed by the other side")]
    Closed { target: String },
}

/// Creates an in-process channel.
pub fn memory_channel() -> (MemorySink, LineReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MemorySink::new(tx), rx)
}
