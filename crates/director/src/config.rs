//! Configuration loading for the behavior director.
//!
//! All tunable scoring, feasibility, planner, and invite constants are loaded
//! from a TOML configuration file. Defaults match the shipped balance, so a
//! missing or partial file is always usable.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete director configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// Desirability scoring settings
    pub scoring: ScoringConfig,
    /// Feasibility scoring settings
    pub feasibility: FeasibilityConfig,
    /// Plan resolution settings
    pub planner: PlannerConfig,
    /// Open invite policy defaults
    pub invites: InviteConfig,
}

impl DirectorConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::TomlError)
    }

    /// Serializes this configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, TomlSerializeError> {
        toml::to_string_pretty(self).map_err(TomlSerializeError)
    }
}

/// Desirability scoring configuration.
///
/// The variety penalty is staged by how recently a goal last ran, with an
/// extra penalty when the goal still sits in the short recent-history queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Runs fresher than this many ticks take the harshest variety factor
    pub variety_recent_ticks: u64,
    /// Variety factor for fresh runs
    pub variety_recent_factor: f32,
    /// Upper bound of the middle variety stage, in ticks
    pub variety_mid_ticks: u64,
    /// Variety factor for the middle stage
    pub variety_mid_factor: f32,
    /// Upper bound of the aged variety stage, in ticks
    pub variety_aged_ticks: u64,
    /// Variety factor for the aged stage
    pub variety_aged_factor: f32,
    /// How many recent-history positions attract the position penalty
    pub history_queue_len: usize,
    /// Position penalty at queue position 0 (most recent)
    pub history_position_base: f32,
    /// Position penalty relaxation per queue position
    pub history_position_step: f32,
    /// Multiplier applied once a goal is past its cooldown upper bound
    pub overdue_boost: f32,
    /// Below this behavioral momentum, idle-bias hints apply
    pub idle_momentum_threshold: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            variety_recent_ticks: 100,
            variety_recent_factor: 0.3,
            variety_mid_ticks: 300,
            variety_mid_factor: 0.7,
            variety_aged_ticks: 600,
            variety_aged_factor: 0.9,
            history_queue_len: 4,
            history_position_base: 0.6,
            history_position_step: 0.1,
            overdue_boost: 1.15,
            idle_momentum_threshold: 0.3,
        }
    }
}

/// Feasibility scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeasibilityConfig {
    /// Minimum owner-distance discount for social goals
    pub owner_discount_floor: f32,
    /// Distance at which the owner discount reaches its floor
    pub owner_full_discount_distance: f32,
    /// Multiplier while mobility-impaired (airborne, not swimming, unmounted)
    pub mobility_penalty: f32,
    /// Multiplier when energy falls outside a goal's operating range
    pub energy_window_factor: f32,
}

impl Default for FeasibilityConfig {
    fn default() -> Self {
        Self {
            owner_discount_floor: 0.2,
            owner_full_discount_distance: 16.0,
            mobility_penalty: 0.3,
            energy_window_factor: 0.5,
        }
    }
}

/// Plan resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum resolutions kept per planner before oldest-insertion eviction
    pub cache_capacity: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { cache_capacity: 64 }
    }
}

/// Open invite policy defaults, applied when a publish supplies non-positive
/// values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InviteConfig {
    /// Default join radius in distance units
    pub default_radius: f32,
    /// Default follower capacity
    pub default_capacity: usize,
    /// Default join window in ticks
    pub default_window_ticks: u64,
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            default_radius: 12.0,
            default_capacity: 4,
            default_window_ticks: 100,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file
    IoError(std::io::Error),
    /// Error parsing TOML config
    TomlError(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            ConfigError::TomlError(e) => Some(e),
        }
    }
}

/// Error that can occur during TOML serialization.
#[derive(Debug)]
pub struct TomlSerializeError(pub toml::ser::Error);

impl std::fmt::Display for TomlSerializeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TOML serialize error: {}", self.0)
    }
}

impl std::error::Error for TomlSerializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Behavior Director Configuration

[scoring]
variety_recent_ticks = 100
variety_recent_factor = 0.3
variety_mid_ticks = 300
variety_mid_factor = 0.7
variety_aged_ticks = 600
variety_aged_factor = 0.9
history_queue_len = 4
history_position_base = 0.6
history_position_step = 0.1
overdue_boost = 1.15
idle_momentum_threshold = 0.3

[feasibility]
owner_discount_floor = 0.2
owner_full_discount_distance = 16.0
mobility_penalty = 0.3
energy_window_factor = 0.5

[planner]
cache_capacity = 64

[invites]
default_radius = 12.0
default_capacity = 4
default_window_ticks = 100
"#
    .to_string()
}
