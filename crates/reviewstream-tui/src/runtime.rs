//! TUI runtime: owns the terminal, drains the channel, handles keys.
//!
//! Each frame the runtime drains whatever lines the channel reader has
//! forwarded, feeds them through the [`Consumer`] (which redraws after every
//! ingested message) and then polls crossterm for input.

use std::io::Stdout;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use reviewstream_core::channel::LineReceiver;
use reviewstream_core::chart::ChartData;
use reviewstream_core::consumer::{Consumer, Dashboard, Summary};
use reviewstream_core::interrupt;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{error, info};

use crate::state::{DashboardState, StreamStatus};
use crate::{render, terminal};

/// Poll interval while the channel is live.
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll interval once the channel has closed.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Upper bound on lines handled per frame so keys stay responsive under a
/// fast producer.
const MAX_LINES_PER_FRAME: usize = 256;

/// [`Dashboard`] that draws the full-screen view to a ratatui terminal.
pub struct TuiDashboard<B: Backend> {
    terminal: Terminal<B>,
    state: DashboardState,
}

impl<B: Backend> TuiDashboard<B> {
    pub fn new(terminal: Terminal<B>, source: impl Into<String>) -> Self {
        Self {
            terminal,
            state: DashboardState::new(source),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn set_status(&mut self, status: StreamStatus) {
        self.state.status = status;
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Redraws the current state.
    ///
    /// # Errors
    /// Returns an error if the backend fails to draw.
    pub fn redraw(&mut self) -> Result<()> {
        self.terminal
            .draw(|frame| render::render(&self.state, frame))
            .map_err(|err| anyhow!("draw dashboard: {err}"))?;
        Ok(())
    }
}

impl<B: Backend> Dashboard for TuiDashboard<B> {
    fn render(&mut self, chart: &ChartData) -> Result<()> {
        self.state.chart.clone_from(chart);
        self.redraw()
    }
}

/// Full-screen dashboard runtime.
///
/// Terminal state is restored on drop, panic, or a forced second Ctrl+C.
pub struct TuiRuntime {
    consumer: Consumer<TuiDashboard<CrosstermBackend<Stdout>>>,
    rx: LineReceiver,
    should_quit: bool,
}

impl TuiRuntime {
    /// Enters the alternate screen and prepares to consume from `rx`.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(rx: LineReceiver, source: impl Into<String>) -> Result<Self> {
        // Set up panic hook BEFORE entering alternate screen
        terminal::install_panic_hook();
        interrupt::set_restore_hook(|| {
            let _ = terminal::restore_terminal();
        });
        interrupt::clear();

        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        Ok(Self {
            consumer: Consumer::new(TuiDashboard::new(terminal, source)),
            rx,
            should_quit: false,
        })
    }

    /// Runs until the user quits.
    ///
    /// A closed channel keeps the final charts on screen; a failed channel
    /// ends the run with its error.
    ///
    /// # Errors
    /// Returns the channel failure, or a terminal I/O error.
    pub fn run(&mut self) -> Result<Summary> {
        self.event_loop()?;
        Ok(self.consumer.summary())
    }

    fn event_loop(&mut self) -> Result<()> {
        // Initial frame so the header shows before the first message.
        self.consumer.render();

        while !self.should_quit {
            if interrupt::is_interrupted() {
                self.consumer
                    .dashboard_mut()
                    .set_status(StreamStatus::Interrupted);
                break;
            }

            let handled = self.drain_channel()?;

            let poll_duration = if handled > 0 {
                Duration::ZERO
            } else if self.is_live() {
                FRAME_DURATION
            } else {
                IDLE_POLL_DURATION
            };

            let mut dirty = false;
            if event::poll(poll_duration)? {
                dirty |= self.handle_terminal_event(&event::read()?);
                // Drain any remaining buffered events (non-blocking)
                while event::poll(Duration::ZERO)? {
                    dirty |= self.handle_terminal_event(&event::read()?);
                }
            }

            if dirty && !self.should_quit {
                self.consumer.render();
            }
        }

        Ok(())
    }

    fn is_live(&self) -> bool {
        self.consumer.dashboard().state().status == StreamStatus::Live
    }

    /// Feeds pending lines to the consumer. Returns how many were handled.
    fn drain_channel(&mut self) -> Result<usize> {
        if !self.is_live() {
            return Ok(0);
        }

        let mut handled = 0;
        while handled < MAX_LINES_PER_FRAME {
            match self.rx.try_recv() {
                Ok(Ok(line)) => {
                    self.consumer.handle_line(&line);
                    handled += 1;
                }
                Ok(Err(err)) => {
                    error!("channel failed: {err}");
                    return Err(err.into());
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    info!("channel closed");
                    self.consumer
                        .dashboard_mut()
                        .set_status(StreamStatus::Closed);
                    self.consumer.render();
                    break;
                }
            }
        }
        Ok(handled)
    }

    /// Applies one terminal event. Returns whether a redraw is needed.
    fn handle_terminal_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Key(key) if is_quit_key(key) => {
                self.should_quit = true;
                false
            }
            Event::Resize(..) => true,
            _ => false,
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}

/// `q`, `Esc` or `Ctrl+C`. Raw mode delivers Ctrl+C as a key, not a signal.
fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
