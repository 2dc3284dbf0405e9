mod cli;
mod modes;

use reviewstream_core::channel::ChannelError;

/// Exit status for a channel that cannot be opened or fails mid-run.
const EXIT_CHANNEL_UNAVAILABLE: i32 = 11;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{e:#}"); // pretty anyhow chain
        if e.chain().any(|cause| cause.is::<ChannelError>()) {
            std::process::exit(EXIT_CHANNEL_UNAVAILABLE);
        }
        std::process::exit(1);
    }
}
