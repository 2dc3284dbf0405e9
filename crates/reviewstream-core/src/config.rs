//! Configuration management for reviewstream.
//!
//! Loads configuration from ${REVIEWSTREAM_HOME}/config.toml with sensible
//! defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::channel::ChannelSpec;

/// Returns the default configuration template.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for reviewstream configuration and data directories.
    //!
    //! REVIEWSTREAM_HOME resolution order:
    //! 1. REVIEWSTREAM_HOME environment variable (if set)
    //! 2. ~/.config/reviewstream (default)

    use std::path::PathBuf;

    /// Returns the reviewstream home directory.
    pub fn reviewstream_home() -> PathBuf {
        if let Ok(home) = std::env::var("REVIEWSTREAM_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".reviewstream"),
            |h| h.join(".config").join("reviewstream"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        reviewstream_home().join("config.toml")
    }

    /// Returns the default live data file shared by producer and consumer.
    pub fn live_data_path() -> PathBuf {
        reviewstream_home().join("live").join("reviews.jsonl")
    }

    /// Returns the default log directory.
    pub fn logs_dir() -> PathBuf {
        reviewstream_home().join("logs")
    }
}

/// Generator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Pause between published messages, in milliseconds.
    pub interval_ms: u64,
    pub min_score: u32,
    pub max_score: u32,
    /// Fixed RNG seed; random when unset.
    pub seed: Option<u64>,
    /// Genre label → relative weight. Empty means uniform.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub weights: BTreeMap<String, u32>,
}

impl GeneratorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            min_score: 50,
            max_score: 99,
            seed: None,
            weights: BTreeMap::new(),
        }
    }
}

/// Channel settings shared by `produce` and `consume`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// NDJSON file path or "-" for stdio.
    pub path: Option<String>,
    /// Keep reading a file after reaching its end.
    pub follow: bool,
    pub poll_interval_ms: u64,
}

impl ChannelConfig {
    /// The configured channel, or the live data file when unset.
    pub fn spec(&self) -> ChannelSpec {
        self.path.as_deref().map_or_else(
            || ChannelSpec::File(paths::live_data_path()),
            ChannelSpec::parse,
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            path: None,
            follow: true,
            poll_interval_ms: 100,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when RUST_LOG is unset.
    pub level: String,
    /// Directory for the dashboard log file.
    pub dir: Option<String>,
}

impl LogConfig {
    pub fn dir(&self) -> PathBuf {
        self.dir
            .as_deref()
            .map_or_else(paths::logs_dir, PathBuf::from)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub channel: ChannelConfig,
    pub log: LogConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}
