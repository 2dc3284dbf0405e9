//! Full-screen ratatui dashboard for reviewstream.

pub mod pie;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;

use std::io::{IsTerminal, Write, stderr, stdout};

use anyhow::{Result, bail};
use reviewstream_core::channel::LineReceiver;
use reviewstream_core::consumer::Summary;
pub use runtime::{TuiDashboard, TuiRuntime};

/// Runs the full-screen dashboard over `rx` until the user quits.
///
/// # Errors
/// Fails when stdout is not a terminal, the terminal cannot be set up, or the
/// channel fails mid-run.
pub fn run_dashboard(rx: LineReceiver, source: &str) -> Result<Summary> {
    if !stdout().is_terminal() {
        bail!(
            "The dashboard requires a terminal.\n\
             Use `--plain` to print tables instead."
        );
    }

    // Print pre-TUI info to stderr (will be replaced by alternate screen)
    let mut err = stderr();
    writeln!(err, "reviewstream dashboard")?;
    writeln!(err, "Channel: {source}")?;
    err.flush()?;

    let mut runtime = TuiRuntime::new(rx, source)?;
    let result = runtime.run();
    // Restore before the caller prints anything.
    drop(runtime);
    result
}
