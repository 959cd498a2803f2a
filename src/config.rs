//! Game configuration.

use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::tile::TileTimings;

/// Configuration for a game session.
///
/// All fields are defaulted, so an empty TOML file (or no file at all)
/// yields the stock game: 20 tiles, a 1.5 s active window, and re-arm
/// delays drawn from [3, 14] whole seconds.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of tiles in the grid.
    #[serde(default = "default_tile_count")]
    tile_count: usize,

    /// Seconds a tile stays active before flipping back on its own.
    #[serde(default = "default_active_window_secs")]
    active_window_secs: f64,

    /// Lower bound (inclusive) of the re-arm delay, in whole seconds.
    #[serde(default = "default_rearm_min_secs")]
    rearm_min_secs: u64,

    /// Upper bound (inclusive) of the re-arm delay, in whole seconds.
    #[serde(default = "default_rearm_max_secs")]
    rearm_max_secs: u64,
}

fn default_tile_count() -> usize {
    20
}

fn default_active_window_secs() -> f64 {
    1.5
}

fn default_rearm_min_secs() -> u64 {
    3
}

fn default_rearm_max_secs() -> u64 {
    14
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_count: default_tile_count(),
            active_window_secs: default_active_window_secs(),
            rearm_min_secs: default_rearm_min_secs(),
            rearm_max_secs: default_rearm_max_secs(),
        }
    }
}

impl GameConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the active window is not a positive
    /// finite number, the re-arm lower bound is zero, or the re-arm range
    /// is inverted.
    pub fn new(
        tile_count: usize,
        active_window_secs: f64,
        rearm_min_secs: u64,
        rearm_max_secs: u64,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            tile_count,
            active_window_secs,
            rearm_min_secs,
            rearm_max_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("loading game config");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        info!(
            tiles = config.tile_count,
            active_window_secs = config.active_window_secs,
            "config loaded"
        );
        Ok(config)
    }

    /// Returns a copy with a different tile count.
    pub fn with_tile_count(mut self, tile_count: usize) -> Self {
        self.tile_count = tile_count;
        self
    }

    /// Timing parameters handed to each tile.
    pub fn timings(&self) -> TileTimings {
        TileTimings {
            active_window: Duration::from_secs_f64(self.active_window_secs),
            rearm_min_secs: self.rearm_min_secs,
            rearm_max_secs: self.rearm_max_secs,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.active_window_secs.is_finite() || self.active_window_secs <= 0.0 {
            return Err(ConfigError::new(format!(
                "active_window_secs must be positive and finite, got {}",
                self.active_window_secs
            )));
        }
        if self.rearm_min_secs == 0 {
            return Err(ConfigError::new("rearm_min_secs must be at least 1"));
        }
        if self.rearm_min_secs > self.rearm_max_secs {
            return Err(ConfigError::new(format!(
                "re-arm range is inverted: [{}, {}]",
                self.rearm_min_secs, self.rearm_max_secs
            )));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where the error was raised.
    pub line: u32,
    /// Source file where the error was raised.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
