//! Agent configuration with documented constants
//!
//! All magic numbers of the build orchestrator are collected here. The
//! config is passed explicitly to every operation that needs it; there is no
//! process-wide instance.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{AiError, Result};
use crate::core::types::Tick;

/// Configuration for the settlement build orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    // === SCHEDULING ===
    /// Ticks between two decision passes in steady state
    pub tick_interval: Tick,

    /// Delay of the very first decision pass after construction
    ///
    /// Offset by one from `tick_interval` so a freshly created agent does not
    /// land on the same tick as agents created alongside it.
    pub first_tick_offset: Tick,

    // === ECONOMY ===
    /// Tax rate applied once when the settlement comes under control
    pub initial_tax_rate: f32,

    /// Food production must exceed consumption by this factor
    pub food_margin_factor: f32,

    /// Constant added on top of the scaled consumption
    ///
    /// Keeps the comparison from flapping when production equals demand.
    pub food_margin_epsilon: f32,

    /// Share of food storage capacity that counts as a comfortable buffer
    pub storage_buffer_ratio: f32,

    /// Absolute amount added to the buffer threshold
    pub storage_buffer_constant: f32,

    // === VILLAGE ===
    /// Tents required before decorative buildings are considered
    pub pavilion_tent_threshold: usize,

    /// Tents laid out in the village plan
    pub tents_to_build: usize,

    /// Pavilions laid out in the village plan
    pub pavilions_to_build: usize,

    /// Road plots laid out in front of the village
    pub road_plots: usize,

    // === PRODUCTION ===
    /// History samples a producer needs before its measured rate is trusted
    ///
    /// Below this count the producer is "ramping" and its modelled rate is
    /// used instead.
    pub maturity_threshold: usize,

    /// Samples kept per produced resource
    ///
    /// Must be at least `maturity_threshold`, otherwise no producer could
    /// ever mature.
    pub history_window: usize,

    /// Production buildings one storage building can serve
    pub collectors_per_storage: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            tick_interval: 32,
            first_tick_offset: 31,

            initial_tax_rate: 0.5,
            food_margin_factor: 1.02,
            food_margin_epsilon: 0.001,
            storage_buffer_ratio: 0.7,
            storage_buffer_constant: 4.0,

            pavilion_tent_threshold: 10,
            tents_to_build: 16,
            pavilions_to_build: 2,
            road_plots: 4,

            maturity_threshold: 20,
            history_window: 64,
            collectors_per_storage: 6,
        }
    }
}

impl AiConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AiConfig = toml::from_str(content)?;
        config.validate().map_err(AiError::InvalidConfig)?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.tick_interval == 0 || self.first_tick_offset == 0 {
            return Err("tick_interval and first_tick_offset must be positive".into());
        }

        if self.maturity_threshold > self.history_window {
            return Err(format!(
                "maturity_threshold ({}) must not exceed history_window ({})",
                self.maturity_threshold, self.history_window
            ));
        }

        if self.food_margin_factor < 1.0 || self.food_margin_epsilon < 0.0 {
            return Err(format!(
                "food margin ({} * c + {}) must not undercut consumption",
                self.food_margin_factor, self.food_margin_epsilon
            ));
        }

        if !(0.0..=1.0).contains(&self.storage_buffer_ratio) {
            return Err(format!(
                "storage_buffer_ratio ({}) must be within [0, 1]",
                self.storage_buffer_ratio
            ));
        }

        if self.collectors_per_storage == 0 {
            return Err("collectors_per_storage must be positive".into());
        }

        Ok(())
    }
}
