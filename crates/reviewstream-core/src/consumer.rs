//! Consumer side: decode, aggregate, redraw.
//!
//! [`Consumer`] owns the [`StatsTable`] and a [`Dashboard`]. Every raw line
//! goes through [`Consumer::handle_line`]; a valid event is ingested and the
//! dashboard redrawn, a malformed one is logged and counted. Nothing here is
//! shared, so no locking is involved.

use std::fmt;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::channel::LineReceiver;
use crate::chart::ChartData;
use crate::event::{DecodeError, ReviewEvent, decode};
use crate::interrupt;
use crate::stats::StatsTable;

/// A display surface for the charts.
pub trait Dashboard {
    /// Draws `chart`.
    ///
    /// # Errors
    /// A failed draw is logged and skipped by the consumer; the next call
    /// tries again.
    fn render(&mut self, chart: &ChartData) -> Result<()>;
}

/// Result of handling one raw message.
#[derive(Debug)]
pub enum LineOutcome {
    Ingested(ReviewEvent),
    Dropped(DecodeError),
}

/// Totals reported when a consumer stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub ingested: u64,
    pub dropped: u64,
    pub genres: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Consumed {} message(s) across {} genre(s), dropped {} malformed.",
            self.ingested, self.genres, self.dropped
        )
    }
}

/// Why [`run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The writer side finished (EOF, closed pipe, producer done).
    Closed,
    /// Ctrl+C.
    Interrupted,
}

pub struct Consumer<D> {
    table: StatsTable,
    dashboard: D,
    render_failures: u64,
}

impl<D: Dashboard> Consumer<D> {
    pub fn new(dashboard: D) -> Self {
        Self {
            table: StatsTable::new(),
            dashboard,
            render_failures: 0,
        }
    }

    /// Decodes and ingests one raw message, then redraws.
    ///
    /// Malformed messages leave the per-genre stats untouched.
    pub fn handle_line(&mut self, raw: &str) -> LineOutcome {
        match decode(raw) {
            Ok(event) => {
                self.ingest(event);
                self.render();
                LineOutcome::Ingested(event)
            }
            Err(err) => {
                warn!("dropping malformed message ({err}): {raw}");
                self.table.record_drop();
                LineOutcome::Dropped(err)
            }
        }
    }

    pub fn ingest(&mut self, event: ReviewEvent) {
        self.table.ingest(event);
        if let Some(stats) = self.table.get(event.genre) {
            info!(
                genre = %event.genre,
                score = event.score,
                count = stats.message_count,
                average = format_args!("{:.1}", stats.average()),
                "ingested review"
            );
        }
    }

    /// Recomputes the chart data and hands it to the dashboard.
    pub fn render(&mut self) {
        let chart = ChartData::from_table(&self.table);
        match self.dashboard.render(&chart) {
            Ok(()) => debug!(genres = chart.bars.len(), "dashboard redrawn"),
            Err(err) => {
                self.render_failures += 1;
                warn!("render failed, skipping this redraw: {err:#}");
            }
        }
    }

    pub fn table(&self) -> &StatsTable {
        &self.table
    }

    pub fn dashboard(&self) -> &D {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut D {
        &mut self.dashboard
    }

    pub fn render_failures(&self) -> u64 {
        self.render_failures
    }

    pub fn summary(&self) -> Summary {
        Summary {
            ingested: self.table.total_messages(),
            dropped: self.table.dropped(),
            genres: self.table.genre_count(),
        }
    }
}

/// Feeds every delivery from `rx` through `consumer` until the stream ends
/// or Ctrl+C.
///
/// # Errors
/// Returns the [`crate::channel::ChannelError`] that ended the channel, if
/// it failed rather than closed.
pub async fn run<D: Dashboard>(
    consumer: &mut Consumer<D>,
    rx: &mut LineReceiver,
) -> Result<StreamEnd> {
    loop {
        tokio::select! {
            delivery = rx.recv() => match delivery {
                Some(Ok(line)) => {
                    consumer.handle_line(&line);
                }
                Some(Err(err)) => return Err(err.into()),
                None => {
                    info!("channel closed");
                    return Ok(StreamEnd::Closed);
                }
            },
            () = interrupt::wait_for_interrupt() => {
                warn!("consumer interrupted by user");
                return Ok(StreamEnd::Interrupted);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::bail;
    use tokio::sync::mpsc;

    use super::*;
    use crate::channel::ChannelError;
    use crate::event::Genre;

    #[derive(Default)]
    struct Recording {
        frames: Vec<ChartData>,
    }

    impl Dashboard for Recording {
        fn render(&mut self, chart: &ChartData) -> Result<()> {
            self.frames.push(chart.clone());
            Ok(())
        }
    }

    /// Fails every other draw.
    #[derive(Default)]
    struct Flaky {
        calls: u32,
        drawn: u32,
    }

    impl Dashboard for Flaky {
        fn render(&mut self, _chart: &ChartData) -> Result<()> {
            self.calls += 1;
            if self.calls % 2 == 1 {
                bail!("terminal went away");
            }
            self.drawn += 1;
            Ok(())
        }
    }

    #[test]
    fn test_two_rpg_reviews_average_to_85() {
        let mut consumer = Consumer::new(Recording::default());
        consumer.handle_line(r#"{"category":"RPG","Review Score":80}"#);
        consumer.handle_line(r#"{"category":"RPG","Review Score":90}"#);

        let rpg = consumer.table().get(Genre::Rpg).unwrap();
        assert_eq!((rpg.total_score, rpg.message_count), (170, 2));
        assert!((rpg.average() - 85.0).abs() < f64::EPSILON);
        assert_eq!(consumer.dashboard().frames.len(), 2);
    }

    #[test]
    fn test_malformed_message_leaves_table_unchanged() {
        let mut consumer = Consumer::new(Recording::default());
        consumer.handle_line(r#"{"category":"RPG","Review Score":80}"#);
        let before = ChartData::from_table(consumer.table());

        let outcome = consumer.handle_line(r#"{"category": "RPG"}"#);

        assert!(matches!(
            outcome,
            LineOutcome::Dropped(DecodeError::MissingField(_))
        ));
        let after = ChartData::from_table(consumer.table());
        assert_eq!(before.bars, after.bars);
        assert_eq!(before.slices, after.slices);
        assert_eq!(consumer.summary().dropped, 1);
        assert_eq!(consumer.dashboard().frames.len(), 1);
    }

    #[test]
    fn test_rpg_and_shooter_split_the_pie_evenly() {
        let mut consumer = Consumer::new(Recording::default());
        consumer.handle_line(r#"{"category":"RPG","Review Score":100}"#);
        consumer.handle_line(r#"{"category":"Shooter","Review Score":50}"#);

        let chart = consumer.dashboard().frames.last().unwrap();
        let shares: Vec<f64> = chart.slices.iter().map(|s| s.share).collect();
        let heights: Vec<f64> = chart.bars.iter().map(|b| b.average).collect();
        assert_eq!(shares, vec![0.5, 0.5]);
        assert_eq!(heights, vec![100.0, 50.0]);
    }

    #[test]
    fn test_render_twice_without_ingest_is_idempotent() {
        let mut consumer = Consumer::new(Recording::default());
        consumer.handle_line(r#"{"category":"Horror","Review Score":64}"#);

        consumer.render();
        consumer.render();

        let frames = &consumer.dashboard().frames;
        assert_eq!(frames[frames.len() - 1], frames[frames.len() - 2]);
    }

    #[test]
    fn test_render_failures_are_skipped_not_fatal() {
        let mut consumer = Consumer::new(Flaky::default());
        for score in [10, 20, 30] {
            consumer.handle_line(&format!(r#"{{"category":"Sports","Review Score":{score}}}"#));
        }

        assert_eq!(consumer.render_failures(), 2);
        assert_eq!(consumer.dashboard().drawn, 1);
        assert_eq!(consumer.summary().ingested, 3);
    }

    #[test]
    fn test_summary_display() {
        let summary = Summary {
            ingested: 4,
            dropped: 1,
            genres: 2,
        };
        assert_eq!(
            summary.to_string(),
            "Consumed 4 message(s) across 2 genre(s), dropped 1 malformed."
        );
    }

    #[tokio::test]
    async fn test_run_stops_when_channel_closes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(Ok(r#"{"category":"MMO","Review Score":70}"#.to_string()))
            .unwrap();
        tx.send(Ok("garbage".to_string())).unwrap();
        tx.send(Ok(r#"{"category":"FPS","Review Score":90}"#.to_string()))
            .unwrap();
        drop(tx);

        let mut consumer = Consumer::new(Recording::default());
        let end = run(&mut consumer, &mut rx).await.unwrap();

        assert_eq!(end, StreamEnd::Closed);
        assert_eq!(
            consumer.summary(),
            Summary {
                ingested: 2,
                dropped: 1,
                genres: 2
            }
        );
    }

    #[tokio::test]
    async fn test_run_surfaces_channel_failure() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(Err(ChannelError::Closed {
            target: "memory".to_string(),
        }))
        .unwrap();

        let mut consumer = Consumer::new(Recording::default());
        let err = run(&mut consumer, &mut rx).await.unwrap_err();
        assert!(err.downcast_ref::<ChannelError>().is_some());
    }
}
