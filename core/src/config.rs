//! Engine configuration loaded from TOML.
//!
//! ```toml
//! max_undo = 200
//! poll_interval_ms = 250
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::command::DEFAULT_MAX_UNDO;
use crate::lock::DEFAULT_POLL_INTERVAL;

/// Errors raised while loading an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse engine config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables for a [`CommandProcessor`](crate::processor::CommandProcessor)
/// and the guards it hands out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of undo steps kept per processor.
    pub max_undo: usize,
    /// How often a blocked execute-guard re-checks the lock and its
    /// cancellation source, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_MAX_UNDO,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
        }
    }
}

impl EngineConfig {
    /// `poll_interval_ms` as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Parses a config from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("loaded engine config from {}: {config:?}", path.display());
        Ok(config)
    }

    /// Loads `path` if it exists, falling back to defaults otherwise.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::debug!("{} not found, using default engine config", path.display());
            Ok(Self::default())
        }
    }
}
