//! CLI command handlers.

pub mod config;
pub mod consume;
pub mod demo;
pub mod produce;

use reviewstream_core::config::{Config, GeneratorConfig};
use reviewstream_core::producer::ProducerOptions;

/// Generator settings given on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratorOverrides {
    pub interval_ms: Option<u64>,
    pub count: Option<u64>,
    pub seed: Option<u64>,
}

impl GeneratorOverrides {
    /// Config generator section with the flags applied on top.
    pub fn generator_config(&self, config: &Config) -> GeneratorConfig {
        let mut generator = config.generator.clone();
        if let Some(interval_ms) = self.interval_ms {
            generator.interval_ms = interval_ms;
        }
        if self.seed.is_some() {
            generator.seed = self.seed;
        }
        generator
    }

    pub fn producer_options(&self, generator: &GeneratorConfig) -> ProducerOptions {
        ProducerOptions {
            interval: generator.interval(),
            count: self.count,
        }
    }
}
