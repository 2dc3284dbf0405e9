//! CLI entry and dispatch.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use reviewstream_core::config::Config;
use reviewstream_core::interrupt;
use reviewstream_core::logging::{self, LogTarget};

use crate::modes::DisplayMode;

mod commands;

/// How long shutdown waits for channel readers still blocked on I/O
/// (typically stdin).
const SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

#[derive(Parser)]
#[command(name = "reviewstream")]
#[command(version)]
#[command(about = "Synthetic game-review stream with a live per-genre dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Generator flags shared by `produce` and `demo`.
#[derive(clap::Args, Debug, Clone, Default)]
struct GeneratorArgs {
    /// Pause between messages in milliseconds (default from config: 1000)
    #[arg(long, value_name = "MS", env = "REVIEWSTREAM_INTERVAL_MS")]
    interval_ms: Option<u64>,

    /// Stop after this many messages (default: run until Ctrl+C)
    #[arg(long, value_name = "N")]
    count: Option<u64>,

    /// Seed for a reproducible stream
    #[arg(long, value_name = "N")]
    seed: Option<u64>,
}

impl From<&GeneratorArgs> for commands::GeneratorOverrides {
    fn from(args: &GeneratorArgs) -> Self {
        commands::GeneratorOverrides {
            interval_ms: args.interval_ms,
            count: args.count,
            seed: args.seed,
        }
    }
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Generate random reviews and publish them to a channel
    Produce {
        /// Channel to write: a file path, or "-" for stdout
        #[arg(long, value_name = "CHANNEL", env = "REVIEWSTREAM_CHANNEL")]
        output: Option<String>,

        #[command(flatten)]
        generator: GeneratorArgs,

        /// Append to an existing file instead of starting it fresh
        #[arg(long)]
        append: bool,
    },

    /// Consume reviews from a channel and chart them live
    Consume {
        /// Channel to read: a file path, or "-" for stdin
        #[arg(long, value_name = "CHANNEL", env = "REVIEWSTREAM_CHANNEL")]
        input: Option<String>,

        /// Keep reading the file for new lines after reaching its end
        #[arg(long, overrides_with = "no_follow")]
        follow: bool,

        /// Stop at the end of the file
        #[arg(long = "no-follow", overrides_with = "follow")]
        no_follow: bool,

        /// Print a table per message instead of the full-screen dashboard
        #[arg(long)]
        plain: bool,
    },

    /// Run producer and consumer in one process over an in-memory channel
    Demo {
        #[command(flatten)]
        generator: GeneratorArgs,

        /// Print a table per message instead of the full-screen dashboard
        #[arg(long)]
        plain: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

impl Commands {
    /// Display mode for commands that chart, `None` for the rest.
    fn display_mode(&self) -> Option<DisplayMode> {
        match self {
            Commands::Consume { plain, .. } | Commands::Demo { plain, .. } => {
                Some(DisplayMode::select(*plain))
            }
            Commands::Produce { .. } | Commands::Config { .. } => None,
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().context("load config")?;

    // The dashboard owns the terminal, so its logs go to a file.
    let log_target = match cli.command.display_mode() {
        Some(DisplayMode::Tui) => LogTarget::File(config.log.dir()),
        Some(DisplayMode::Plain) | None => LogTarget::Stderr,
    };
    let _log_guard = logging::init(&config.log.level, &log_target)?;

    interrupt::init()?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    let result = rt.block_on(async move { dispatch(cli, &config).await });
    rt.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

async fn dispatch(cli: Cli, config: &Config) -> Result<()> {
    let mode = cli.command.display_mode();

    match cli.command {
        Commands::Produce {
            output,
            generator,
            append,
        } => {
            commands::produce::run(commands::produce::ProduceOptions {
                config,
                output: output.as_deref(),
                overrides: (&generator).into(),
                append,
            })
            .await
        }

        Commands::Consume {
            input,
            follow,
            no_follow,
            plain: _,
        } => {
            let follow = match (follow, no_follow) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            commands::consume::run(commands::consume::ConsumeOptions {
                config,
                input: input.as_deref(),
                follow,
                mode: mode.unwrap_or(DisplayMode::Plain),
            })
            .await
        }

        Commands::Demo {
            generator,
            plain: _,
        } => {
            commands::demo::run(
                config,
                (&generator).into(),
                mode.unwrap_or(DisplayMode::Plain),
            )
            .await
        }

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}
