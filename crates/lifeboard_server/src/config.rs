//! # Server Configuration
//!
//! Startup configuration: grid dimensions, listen port, tick interval.
//!
//! ## Design
//!
//! - Defaults match the historical service: 20x20 grid, port 3333, 1000ms
//! - Optionally loaded from a TOML file; CLI flags override file values
//! - Validation happens once at startup, before anything is spawned

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::{DEFAULT_PORT, DEFAULT_SIZE_X, DEFAULT_SIZE_Y, DEFAULT_TICK_MS};

/// Errors from loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was attempted.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Config file was not valid TOML for this schema.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path that was attempted.
        path: String,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// Grid dimensions must both be non-zero.
    #[error("grid dimensions must be non-zero, got {size_x}x{size_y}")]
    ZeroGrid {
        /// Configured width.
        size_x: usize,
        /// Configured height.
        size_y: usize,
    },

    /// The tick interval must be non-zero.
    #[error("tick interval must be non-zero")]
    ZeroTick,
}

/// Server configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Grid width.
    pub size_x: usize,
    /// Grid height.
    pub size_y: usize,
    /// TCP port to bind (0 picks an ephemeral port).
    pub port: u16,
    /// Simulation tick interval in milliseconds.
    pub tick_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            size_x: DEFAULT_SIZE_X,
            size_y: DEFAULT_SIZE_Y,
            port: DEFAULT_PORT,
            tick_interval_ms: DEFAULT_TICK_MS,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] or [`ConfigError::Parse`] on failure.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Checks the configuration for values the server cannot run with.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroGrid`] or [`ConfigError::ZeroTick`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size_x == 0 || self.size_y == 0 {
            return Err(ConfigError::ZeroGrid {
                size_x: self.size_x,
                size_y: self.size_y,
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        Ok(())
    }

    /// Returns the tick interval as a [`Duration`].
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Returns the bind address string for the listener.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.size_x, 20);
        assert_eq!(config.size_y, 20);
        assert_eq!(config.port, 3333);
        assert_eq!(config.tick_interval_ms, 1000);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_toml_takes_defaults() {
        let config: ServerConfig = toml::from_str("port = 4000\nsize_x = 32\n").unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.size_x, 32);
        assert_eq!(config.size_y, 20);
        assert_eq!(config.tick_interval_ms, 1000);
    }

    #[test]
    fn test_zero_grid_rejected() {
        let config = ServerConfig {
            size_x: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroGrid { size_x: 0, size_y: 20 })
        ));
    }

    #[test]
    fn test_zero_tick_rejected() {
        let config = ServerConfig {
            tick_interval_ms: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTick)));
    }
}
