//! Ctrl+C handling shared by the producer and consumer loops.
//!
//! The first Ctrl+C only raises a process-wide flag; the publish loop and
//! the consumers notice it and shut down with a summary. A second Ctrl+C
//! while they are still winding down exits at once with status 130.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tokio::sync::Notify;

/// A shutdown request that loops can poll or await.
struct ShutdownSignal {
    requested: AtomicBool,
    wakeup: OnceLock<Notify>,
}

impl ShutdownSignal {
    const fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
            wakeup: OnceLock::new(),
        }
    }

    fn wakeup(&self) -> &Notify {
        self.wakeup.get_or_init(Notify::new)
    }

    /// Raises the flag. Returns `true` if it was already raised.
    fn raise(&self) -> bool {
        let repeated = self.requested.swap(true, Ordering::SeqCst);
        if !repeated {
            self.wakeup().notify_waiters();
        }
        repeated
    }

    fn is_raised(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    fn lower(&self) {
        self.requested.store(false, Ordering::SeqCst);
    }

    async fn raised(&self) {
        loop {
            // Registered before the flag check so a raise in between still wakes us.
            let notified = self.wakeup().notified();
            if self.is_raised() {
                return;
            }
            notified.await;
        }
    }
}

static SHUTDOWN: ShutdownSignal = ShutdownSignal::new();
static RESTORE_HOOK: OnceLock<Box<dyn Fn() + Send + Sync>> = OnceLock::new();

/// Installs the Ctrl+C handler. Call once, before any loop starts.
///
/// # Errors
/// Returns an error if a handler is already registered.
pub fn init() -> Result<()> {
    ctrlc::set_handler(trigger_ctrl_c).context("install Ctrl+C handler")
}

/// What the Ctrl+C handler runs; also callable directly.
pub fn trigger_ctrl_c() {
    if SHUTDOWN.raise() {
        // process::exit skips Drop, so the dashboard never gets to leave the
        // alternate screen on its own.
        if let Some(hook) = RESTORE_HOOK.get() {
            hook();
        }
        std::process::exit(130);
    }
}

/// Whether the user asked the running loops to stop.
pub fn is_interrupted() -> bool {
    SHUTDOWN.is_raised()
}

/// Completes once Ctrl+C has been pressed, or at once if it already was.
pub async fn wait_for_interrupt() {
    SHUTDOWN.raised().await;
}

/// Forgets an earlier Ctrl+C so a freshly started dashboard does not quit
/// on its first frame.
pub fn clear() {
    SHUTDOWN.lower();
}

/// Sets what runs right before the forced exit on a second Ctrl+C.
///
/// The full-screen dashboard puts the terminal back into normal mode here.
/// Only the first hook registered is kept.
pub fn set_restore_hook<F>(hook: F)
where
    F: Fn() + Send + Sync + 'static,
{
    let _ = RESTORE_HOOK.set(Box::new(hook));
}
