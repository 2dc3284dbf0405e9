//! Consumer side of a channel.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::mpsc;

use super::{ChannelError, ChannelSpec, Delivery, LineReceiver};

/// How a reader treats end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceOptions {
    /// Keep polling a file for new lines instead of ending at EOF.
    /// Ignored for stdin, whose EOF means the writer is gone.
    pub follow: bool,
    pub poll_interval: Duration,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            follow: false,
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Opens the consumer end of `spec` and starts forwarding its lines.
///
/// Opening happens before this returns, so an unavailable channel fails at
/// startup. Later read failures arrive as an `Err` delivery, after which the
/// receiver yields `None`.
///
/// Must be called inside a tokio runtime.
///
/// # Errors
/// Returns [`ChannelError::Open`] if the file cannot be opened.
pub async fn open_source(
    spec: &ChannelSpec,
    options: SourceOptions,
) -> Result<LineReceiver, ChannelError> {
    let target = spec.to_string();
    let (tx, rx) = mpsc::unbounded_channel();

    match spec {
        ChannelSpec::Stdio => {
            let reader = BufReader::new(tokio::io::stdin());
            tokio::spawn(forward_lines(reader, tx, target));
        }
        ChannelSpec::File(path) => {
            let file = File::open(path)
                .await
                .map_err(|source| ChannelError::Open {
                    target: target.clone(),
                    source,
                })?;
            let reader = BufReader::new(file);
            if options.follow {
                let tail = FollowedFile {
                    reader,
                    path: path.clone(),
                    poll: options.poll_interval,
                };
                tokio::spawn(tail.forward(tx, target));
            } else {
                tokio::spawn(forward_lines(reader, tx, target));
            }
        }
    }

    Ok(rx)
}

/// Forwards complete lines from `reader` until EOF, a read error, or the
/// receiver going away.
///
/// Blank lines are skipped. Invalid UTF-8 is replaced rather than treated as
/// a channel failure, so the consumer can reject that one message and carry
/// on. A final line without a newline is still delivered.
async fn forward_lines<R>(mut reader: R, tx: mpsc::UnboundedSender<Delivery>, target: String)
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    loop {
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => {
                if !buf.is_empty() {
                    send_line(&tx, &buf);
                }
                return;
            }
            Ok(_) => {
                let delivered = send_line(&tx, &buf);
                buf.clear();
                if !delivered {
                    return;
                }
            }
            Err(source) => {
                tracing::error!(channel = %target, "channel read failed: {source}");
                let _ = tx.send(Err(ChannelError::Read { target, source }));
                return;
            }
        }
    }
}

/// A data file read like `tail -f`.
struct FollowedFile {
    reader: BufReader<File>,
    path: PathBuf,
    poll: Duration,
}

impl FollowedFile {
    /// Forwards complete lines until a read error or the receiver going away.
    ///
    /// EOF means "wait and retry"; a trailing partial line is held back until
    /// its newline arrives. A producer restart truncates the file, so a file
    /// that is now shorter than what was read is re-read from the start.
    async fn forward(mut self, tx: mpsc::UnboundedSender<Delivery>, target: String) {
        let mut buf = Vec::new();
        let mut consumed: u64 = 0;
        loop {
            match self.reader.read_until(b'\n', &mut buf).await {
                Ok(0) => {
                    if tx.is_closed() {
                        return;
                    }
                    if was_truncated(&self.path, consumed).await {
                        tracing::warn!(
                            channel = %target,
                            "data file was truncated, reading from the start"
                        );
                        buf.clear();
                        if let Err(source) = self.reader.seek(SeekFrom::Start(0)).await {
                            tracing::error!(channel = %target, "rewind failed: {source}");
                            let _ = tx.send(Err(ChannelError::Read { target, source }));
                            return;
                        }
                        consumed = 0;
                        continue;
                    }
                    tokio::time::sleep(self.poll).await;
                }
                Ok(read) => {
                    consumed += read as u64;
                    if buf.last() != Some(&b'\n') {
                        // Partial line at EOF; the next read either finishes it or hits EOF.
                        continue;
                    }
                    let delivered = send_line(&tx, &buf);
                    buf.clear();
                    if !delivered {
                        return;
                    }
                }
                Err(source) => {
                    tracing::error!(channel = %target, "channel read failed: {source}");
                    let _ = tx.send(Err(ChannelError::Read { target, source }));
                    return;
                }
            }
        }
    }
}

/// Whether the file at `path` is now shorter than the `consumed` bytes.
///
/// A file that cannot be inspected counts as unchanged; the next poll tries
/// again.
async fn was_truncated(path: &Path, consumed: u64) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) => meta.len() < consumed,
        Err(err) => {
            tracing::debug!(path = %path.display(), "cannot stat followed file: {err}");
            false
        }
    }
}

/// Sends one line, trimming the newline. Returns `false` once the receiver
/// is gone.
fn send_line(tx: &mpsc::UnboundedSender<Delivery>, raw: &[u8]) -> bool {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return !tx.is_closed();
    }
    tx.send(Ok(line.to_string())).is_ok()
}
