//! Consume command handler.

use anyhow::Result;
use reviewstream_core::channel::{ChannelSpec, SourceOptions, open_source};
use reviewstream_core::config::Config;
use tracing::info;

use crate::modes::{self, DisplayMode};

pub struct ConsumeOptions<'a> {
    pub config: &'a Config,
    pub input: Option<&'a str>,
    /// `--follow` / `--no-follow`; config decides when neither is given.
    pub follow: Option<bool>,
    pub mode: DisplayMode,
}

pub async fn run(options: ConsumeOptions<'_>) -> Result<()> {
    let ConsumeOptions {
        config,
        input,
        follow,
        mode,
    } = options;

    let spec = input.map_or_else(|| config.channel.spec(), ChannelSpec::parse);
    let source_options = SourceOptions {
        follow: follow.unwrap_or(config.channel.follow),
        poll_interval: config.channel.poll_interval(),
    };

    let rx = open_source(&spec, source_options).await?;
    info!(channel = %spec, follow = source_options.follow, "consuming reviews");

    let summary = modes::consume(rx, &spec.to_string(), mode).await?;
    println!("{summary}");
    Ok(())
}
