use crate::defaults;
use crate::error::{EarshotError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub output: OutputConfig,
    pub feed: FeedConfig,
}

/// Model source configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ModelConfig {
    /// Which manager variant loads the model.
    pub mode: ManagerMode,
    /// Base URL for the model documents. Empty means "do not load at startup".
    pub url: String,
}

/// Model manager variants. A closed set keyed by the `mode` config value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ManagerMode {
    #[default]
    Online,
}

/// Output shaping configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub mode: OutputMode,
    /// Enable score filtering in "all" mode.
    pub active_threshold: bool,
    /// Score threshold as a percentage (0–100).
    pub threshold: u8,
    /// Enable result-count truncation in "all" mode.
    pub active_max_results: bool,
    /// Maximum number of results kept after filtering.
    pub max_results: usize,
}

/// Output mode enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Emit only the top-ranked prediction.
    #[default]
    Best,
    /// Emit the full ranked list, filtered and truncated per the options.
    All,
}

/// Feature feed configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    /// Extractor process to spawn (e.g. "python3").
    pub command: String,
    /// Arguments for the extractor process.
    pub args: Vec<String>,
    /// Bytes per feature frame on the extractor's stdout.
    pub frame_bytes: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::Best,
            active_threshold: false,
            threshold: defaults::THRESHOLD,
            active_max_results: false,
            max_results: defaults::MAX_RESULTS,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            command: String::new(),
            args: Vec::new(),
            frame_bytes: defaults::FRAME_BYTES,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't exist
    ///
    /// Only falls back to defaults when the file is missing; invalid TOML is
    /// still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(EarshotError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - EARSHOT_MODEL_URL → model.url
    /// - EARSHOT_OUTPUT → output.mode ("best" or "all")
    /// - EARSHOT_FEED_COMMAND → feed.command
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("EARSHOT_MODEL_URL")
            && !url.is_empty()
        {
            self.model.url = url;
        }

        if let Ok(mode) = std::env::var("EARSHOT_OUTPUT") {
            match mode.as_str() {
                "best" => self.output.mode = OutputMode::Best,
                "all" => self.output.mode = OutputMode::All,
                _ => {}
            }
        }

        if let Ok(command) = std::env::var("EARSHOT_FEED_COMMAND")
            && !command.is_empty()
        {
            self.feed.command = command;
        }

        self
    }

    /// Validate cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let float_bytes = size_of::<f32>();
        if self.feed.frame_bytes % float_bytes != 0 {
            return Err(EarshotError::ConfigInvalidValue {
                key: "feed.frame_bytes".to_string(),
                message: format!("must be a multiple of {float_bytes}"),
            });
        }
        if self.feed.frame_bytes <= defaults::FRAME_METADATA_FLOATS * float_bytes {
            return Err(EarshotError::ConfigInvalidValue {
                key: "feed.frame_bytes".to_string(),
                message: "must leave room for payload after the metadata floats".to_string(),
            });
        }
        if self.output.threshold > 100 {
            return Err(EarshotError::ConfigInvalidValue {
                key: "output.threshold".to_string(),
                message: "must be between 0 and 100".to_string(),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/earshot/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("earshot")
            .join("config.toml")
    }

    /// Render the effective configuration as a TOML document.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| EarshotError::Other(e.to_string()))
    }
}
