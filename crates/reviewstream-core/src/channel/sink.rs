//! Producer side of a channel.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};

use tokio::sync::mpsc;

use super::{ChannelError, ChannelSpec, Delivery};

/// Something the producer can publish serialized events to.
///
/// Implementations must preserve publish order and surface every failure;
/// a message is never dropped silently.
pub trait EventSink {
    /// Publishes one serialized message.
    ///
    /// # Errors
    /// Returns a [`ChannelError`] if the message could not be delivered.
    fn publish(&mut self, line: &str) -> Result<(), ChannelError>;

    /// Flushes anything buffered.
    ///
    /// # Errors
    /// Returns a [`ChannelError`] if buffered data could not be written.
    fn flush(&mut self) -> Result<(), ChannelError> {
        Ok(())
    }
}

/// Writes one JSON message per line to any [`Write`].
///
/// Each publish is flushed so a consumer tailing the file sees it at once.
pub struct NdjsonSink<W: Write> {
    writer: W,
    target: String,
}

impl<W: Write> NdjsonSink<W> {
    pub fn new(writer: W, target: impl Into<String>) -> Self {
        Self {
            writer,
            target: target.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_error(&self, source: io::Error) -> ChannelError {
        ChannelError::Write {
            target: self.target.clone(),
            source,
        }
    }
}

impl NdjsonSink<Box<dyn Write + Send>> {
    /// Opens the producer end of `spec`.
    ///
    /// File channels are truncated unless `append` is set, so every run
    /// starts from an empty live data file. Parent directories are created.
    ///
    /// # Errors
    /// Returns [`ChannelError::Open`] if the file cannot be created.
    pub fn open(spec: &ChannelSpec, append: bool) -> Result<Self, ChannelError> {
        let target = spec.to_string();
        let writer: Box<dyn Write + Send> = match spec {
            ChannelSpec::Stdio => Box::new(io::stdout()),
            ChannelSpec::File(path) => {
                let open_error = |source| ChannelError::Open {
                    target: target.clone(),
                    source,
                };
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(open_error)?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .append(append)
                    .truncate(!append)
                    .open(path)
                    .map_err(open_error)?;
                Box::new(file)
            }
        };
        Ok(Self::new(writer, target))
    }
}

impl<W: Write> EventSink for NdjsonSink<W> {
    fn publish(&mut self, line: &str) -> Result<(), ChannelError> {
        writeln!(self.writer, "{line}").map_err(|e| self.write_error(e))?;
        self.writer.flush().map_err(|e| self.write_error(e))
    }

    fn flush(&mut self) -> Result<(), ChannelError> {
        self.writer.flush().map_err(|e| self.write_error(e))
    }
}

/// Producer end of an in-process channel.
///
/// Dropping it ends the stream for the receiver.
#[derive(Debug, Clone)]
pub struct MemorySink {
    tx: mpsc::UnboundedSender<Delivery>,
}

impl MemorySink {
    pub(super) fn new(tx: mpsc::UnboundedSender<Delivery>) -> Self {
        Self { tx }
    }
}

impl EventSink for MemorySink {
    fn publish(&mut self, line: &str) -> Result<(), ChannelError> {
        self.tx
            .send(Ok(line.to_string()))
            .map_err(|_closed| ChannelError::Closed {
                target: "memory".to_string(),
            })
    }
}
