//! Produce command handler.

use anyhow::{Context, Result};
use reviewstream_core::channel::{ChannelSpec, NdjsonSink};
use reviewstream_core::config::Config;
use reviewstream_core::generator::Generator;
use reviewstream_core::producer;
use tracing::info;

use super::GeneratorOverrides;

pub struct ProduceOptions<'a> {
    pub config: &'a Config,
    pub output: Option<&'a str>,
    pub overrides: GeneratorOverrides,
    pub append: bool,
}

pub async fn run(options: ProduceOptions<'_>) -> Result<()> {
    let ProduceOptions {
        config,
        output,
        overrides,
        append,
    } = options;

    let spec = output.map_or_else(|| config.channel.spec(), ChannelSpec::parse);
    let generator_config = overrides.generator_config(config);
    let mut generator =
        Generator::from_config(&generator_config).context("invalid generator settings")?;

    let mut sink = NdjsonSink::open(&spec, append)?;
    info!(channel = %spec, append, "producing reviews");

    let published = producer::run(
        &mut generator,
        &mut sink,
        overrides.producer_options(&generator_config),
    )
    .await?;

    // stdout may be the channel itself
    eprintln!("Published {published} review(s) to {spec}.");
    Ok(())
}
