//! Consumer display modes.
//!
//! - `plain`: one comfy-table table per message on stdout
//! - `tui`: full-screen dashboard (optional feature)

pub mod plain;

use std::io::{IsTerminal, stdout};

use anyhow::Result;
use reviewstream_core::channel::LineReceiver;
use reviewstream_core::consumer::Summary;
#[cfg(feature = "tui")]
use reviewstream_tui::run_dashboard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Tui,
    Plain,
}

impl DisplayMode {
    /// The dashboard needs a terminal on stdout and the `tui` feature;
    /// otherwise tables are printed.
    pub fn select(plain: bool) -> Self {
        if plain || !cfg!(feature = "tui") || !stdout().is_terminal() {
            DisplayMode::Plain
        } else {
            DisplayMode::Tui
        }
    }
}

/// Consumes `rx` with the chosen display until the stream ends or the user
/// quits.
pub async fn consume(rx: LineReceiver, source: &str, mode: DisplayMode) -> Result<Summary> {
    match mode {
        DisplayMode::Plain => plain::run(rx).await,
        DisplayMode::Tui => run_dashboard(rx, source),
    }
}

#[cfg(not(feature = "tui"))]
fn run_dashboard(_rx: LineReceiver, _source: &str) -> Result<Summary> {
    anyhow::bail!("TUI support is disabled in this build (feature \"tui\").");
}
