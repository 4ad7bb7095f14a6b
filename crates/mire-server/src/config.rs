//! Daemon configuration
//!
//! Loaded once at startup and immutable afterwards. The allocation policy is
//! deliberately absent: it arrives in the handshake, chosen by the memory
//! client, and the daemon interprets nothing beyond the fields below.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Errors that abort startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("reading config file failed: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema
    #[error("parsing config file failed: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parsed but do not describe a usable swap geometry
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Immutable daemon configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Address the daemon listens on
    pub listen_addr: SocketAddr,
    /// Backing file paths, one swap file each
    pub swap_files: Vec<PathBuf>,
    /// Bytes per backing file
    pub swap_size: usize,
    /// Bytes per slot
    pub page_size: usize,
    /// Slots per chunk; the fixed policy's per-process quota
    pub max_frames: usize,
    /// Artificial latency applied to every request, in milliseconds
    pub delay_ms: u64,
}

impl Config {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Slots per swap file
    pub fn max_pages(&self) -> usize {
        self.swap_size / self.page_size
    }

    /// Per-request artificial delay
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.swap_files.is_empty() {
            return Err(ConfigError::Invalid("swap_files must name at least one file"));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be nonzero"));
        }
        if self.max_frames == 0 {
            return Err(ConfigError::Invalid("max_frames must be nonzero"));
        }
        if self.swap_size % self.page_size != 0 {
            return Err(ConfigError::Invalid("page_size must divide swap_size"));
        }
        Ok(())
    }
}
