//! Defines all configuration structures for the Wheelclock engine.
//!
//! `WheelClockConfig` is what an application loads at startup (from a TOML
//! file and `WHEELCLOCK_*` environment variables). `TimerConfiguration` is the
//! smaller triple the running session works with; the user changes it through
//! the settings overlay while the program runs.

use crate::common::{
    DEFAULT_INCREMENT_SECONDS, DEFAULT_INITIAL_TIME_SECONDS, DEFAULT_PLAYERS, MAX_PLAYERS,
    MIN_PLAYERS,
};
use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// File name (without extension) looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "wheelclock";

/// Prefix for environment overrides, e.g. `WHEELCLOCK_PLAYERS=6`.
pub const ENV_PREFIX: &str = "WHEELCLOCK";

/// The user-chosen parameters of a game.
///
/// Invariants: `2 <= player_count <= 12`, `initial_time_seconds > 0`.
/// The session only ever builds values that hold them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfiguration {
    pub player_count: usize,
    pub initial_time_seconds: u64,
    /// Added to a player's clock right after they complete a turn.
    pub increment_seconds: u64,
}

impl Default for TimerConfiguration {
    fn default() -> Self {
        Self {
            player_count: DEFAULT_PLAYERS,
            initial_time_seconds: DEFAULT_INITIAL_TIME_SECONDS,
            increment_seconds: DEFAULT_INCREMENT_SECONDS,
        }
    }
}

/// The top-level configuration for the `WheelClockEngine` and its shell.
#[derive(Debug, Clone, Deserialize)]
pub struct WheelClockConfig {
    /// Number of players seated when the program starts.
    #[serde(default = "default_players")]
    pub players: usize,

    /// Starting time for every player, in seconds.
    #[serde(default = "default_initial_time_seconds")]
    pub initial_time_seconds: u64,

    /// Per-turn bonus, in seconds.
    #[serde(default)]
    pub increment_seconds: u64,

    /// Wall-clock period between ticks. Every tick is one second of game
    /// time no matter what this is set to.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Default tracing filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Initial time choices offered by the settings overlay, in minutes.
    #[serde(default = "default_time_presets")]
    pub time_presets_minutes: Vec<u64>,

    /// Increment choices offered by the settings overlay, in seconds.
    #[serde(default = "default_increment_presets")]
    pub increment_presets_seconds: Vec<u64>,
}

// --- Default value functions for serde ---

fn default_players() -> usize {
    DEFAULT_PLAYERS
}

fn default_initial_time_seconds() -> u64 {
    DEFAULT_INITIAL_TIME_SECONDS
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_time_presets() -> Vec<u64> {
    vec![1, 3, 5, 10, 15, 30]
}

fn default_increment_presets() -> Vec<u64> {
    vec![0, 5, 10, 15, 30, 60]
}

impl Default for WheelClockConfig {
    fn default() -> Self {
        Self {
            players: default_players(),
            initial_time_seconds: default_initial_time_seconds(),
            increment_seconds: DEFAULT_INCREMENT_SECONDS,
            tick_interval_ms: default_tick_interval_ms(),
            log_level: default_log_level(),
            time_presets_minutes: default_time_presets(),
            increment_presets_seconds: default_increment_presets(),
        }
    }
}

impl WheelClockConfig {
    /// Loads the configuration from an optional file plus the environment.
    ///
    /// With `path == None` a `wheelclock.toml` in the working directory is
    /// used if it exists. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("failed to read wheelclock configuration")?;
        Self::from_settings(settings)
    }

    /// Parses a configuration from TOML text, ignoring the environment.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()
            .context("failed to parse wheelclock configuration")?;
        Self::from_settings(settings)
    }

    fn from_settings(settings: Config) -> anyhow::Result<Self> {
        let raw: Self = settings
            .try_deserialize()
            .context("invalid wheelclock configuration")?;
        let config = raw.sanitized();
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Brings loaded values back inside the engine's invariants.
    pub fn sanitized(mut self) -> Self {
        let clamped = self.players.clamp(MIN_PLAYERS, MAX_PLAYERS);
        if clamped != self.players {
            warn!("players = {} is out of range, using {}", self.players, clamped);
            self.players = clamped;
        }
        if self.initial_time_seconds == 0 {
            warn!("initial_time_seconds must be positive, using the default");
            self.initial_time_seconds = default_initial_time_seconds();
        }
        if self.tick_interval_ms == 0 {
            warn!("tick_interval_ms must be positive, using the default");
            self.tick_interval_ms = default_tick_interval_ms();
        }
        self.time_presets_minutes.retain(|&minutes| minutes > 0);
        self.time_presets_minutes.sort_unstable();
        self.time_presets_minutes.dedup();
        self.increment_presets_seconds.sort_unstable();
        self.increment_presets_seconds.dedup();
        self
    }

    /// The game parameters a fresh session starts with.
    pub fn timer_configuration(&self) -> TimerConfiguration {
        TimerConfiguration {
            player_count: self.players,
            initial_time_seconds: self.initial_time_seconds,
            increment_seconds: self.increment_seconds,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = WheelClockConfig::from_toml("").unwrap();
        assert_eq!(config.players, 4);
        assert_eq!(config.initial_time_seconds, 300);
        assert_eq!(config.increment_seconds, 0);
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.time_presets_minutes, vec![1, 3, 5, 10, 15, 30]);
        assert_eq!(config.increment_presets_seconds, vec![0, 5, 10, 15, 30, 60]);
    }

    #[test]
    fn values_are_read_from_toml() {
        let config = WheelClockConfig::from_toml(
            r#"
            players = 6
            initial_time_seconds = 600
            increment_seconds = 10
            tick_interval_ms = 250
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.timer_configuration(),
            TimerConfiguration {
                player_count: 6,
                initial_time_seconds: 600,
                increment_seconds: 10,
            }
        );
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn out_of_range_values_are_sanitized() {
        let config = WheelClockConfig::from_toml(
            r#"
            players = 40
            initial_time_seconds = 0
            tick_interval_ms = 0
            time_presets_minutes = [10, 0, 5, 10]
            "#,
        )
        .unwrap();
        assert_eq!(config.players, 12);
        assert_eq!(config.initial_time_seconds, 300);
        assert_eq!(config.tick_interval_ms, 1000);
        assert_eq!(config.time_presets_minutes, vec![5, 10]);

        let config = WheelClockConfig::from_toml("players = 1").unwrap();
        assert_eq!(config.players, 2);
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(WheelClockConfig::from_toml("players = \"many\"").is_err());
    }
}
