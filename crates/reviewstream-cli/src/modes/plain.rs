//! Plain-text dashboard: a table per message.

use std::io::{self, Write};

use anyhow::{Context, Result};
use comfy_table::{CellAlignment, Table};
use reviewstream_core::channel::LineReceiver;
use reviewstream_core::chart::ChartData;
use reviewstream_core::consumer::{self, Consumer, Dashboard, Summary};
use tracing::info;

/// Writes a comfy-table snapshot of the charts after every message.
pub struct PlainDashboard<W: Write> {
    out: W,
}

impl<W: Write> PlainDashboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Dashboard for PlainDashboard<W> {
    fn render(&mut self, chart: &ChartData) -> Result<()> {
        writeln!(
            self.out,
            "{}\nmessages: {}  dropped: {}\n",
            chart_table(chart),
            chart.total,
            chart.dropped
        )
        .context("write table")?;
        self.out.flush().context("flush table")?;
        Ok(())
    }
}

/// Genre, count, average and share, one row per genre in discovery order.
pub fn chart_table(chart: &ChartData) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Genre", "Reviews", "Average", "Share"]);

    for (bar, slice) in chart.bars.iter().zip(&chart.slices) {
        table.add_row(vec![
            bar.genre.to_string(),
            slice.count.to_string(),
            format!("{:.1}", bar.average),
            format!("{:.1}%", slice.share * 100.0),
        ]);
    }

    for index in 1..=3 {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    table
}

/// Consumes until the channel closes or Ctrl+C.
pub async fn run(mut rx: LineReceiver) -> Result<Summary> {
    let mut consumer = Consumer::new(PlainDashboard::new(io::stdout()));
    let end = consumer::run(&mut consumer, &mut rx).await?;
    info!(?end, "consumer stopped");
    Ok(consumer.summary())
}
