// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Configuration module

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::remediation::DEFAULT_ALERT_CAPACITY;
use crate::sensors::{default_layout, InjectionRates, LocationEntry};

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Simulation configuration
    pub simulation: SimulationConfig,

    /// Campus layout
    pub campus: CampusConfig,

    /// Engine configuration
    pub engine: EngineConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("ecotwin"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;
        for (name, p) in [("power_surge_probability", sim.power_surge_probability), ("water_leak_probability", sim.water_leak_probability)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(anyhow!("simulation.{} must be within [0, 1], got {}", name, p));
            }
        }
        if !sim.seconds_per_tick.is_finite() || sim.seconds_per_tick < 0.0 {
            return Err(anyhow!("simulation.seconds_per_tick must be non-negative"));
        }
        if self.campus.locations.is_empty() {
            return Err(anyhow!("campus.locations must list at least one location"));
        }
        if self.engine.tick_interval_ms == 0 {
            return Err(anyhow!("engine.tick_interval_ms must be positive"));
        }
        if self.engine.event_channel_capacity == 0 {
            return Err(anyhow!("engine.event_channel_capacity must be positive"));
        }
        Ok(())
    }
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for every sensor noise stream
    pub seed: u64,

    /// Simulated hour of day at tick 0
    pub start_hour: f64,

    /// Simulated seconds per tick
    pub seconds_per_tick: f64,

    /// Chance per tick of a power surge on a power sensor
    pub power_surge_probability: f64,

    /// Chance per tick of a leak on a flow sensor
    pub water_leak_probability: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let rates = InjectionRates::default();
        Self {
            seed: 42,
            start_hour: 8.0,
            seconds_per_tick: 60.0,
            power_surge_probability: rates.power_surge,
            water_leak_probability: rates.water_leak,
        }
    }
}

impl SimulationConfig {
    pub fn injection_rates(&self) -> InjectionRates {
        InjectionRates {
            power_surge: self.power_surge_probability,
            water_leak: self.water_leak_probability,
        }
    }
}

/// Campus layout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampusConfig {
    pub locations: Vec<LocationEntry>,
}

impl Default for CampusConfig {
    fn default() -> Self {
        Self {
            locations: default_layout(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Driver period in milliseconds
    pub tick_interval_ms: u64,

    /// Alerts kept in the log
    pub alert_log_capacity: usize,

    /// Broadcast buffer per subscriber
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            alert_log_capacity: DEFAULT_ALERT_CAPACITY,
            event_channel_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::LocationCategory;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.campus.locations.len(), 9);
        assert_eq!(config.engine.tick_interval_ms, 1000);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("[[campus.locations]]"));
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let text = r#"
            [simulation]
            seed = 7

            [[campus.locations]]
            id = "lab_9"
            name = "Robotics Lab"
            category = "laboratory"
        "#;
        let config: Config = toml::from_str(text).unwrap();
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.simulation.start_hour, 8.0);
        assert_eq!(config.campus.locations.len(), 1);
        assert_eq!(config.campus.locations[0].category, LocationCategory::Laboratory);
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.simulation.water_leak_probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.campus.locations.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.engine.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let path = std::env::temp_dir()
            .join(format!("ecotwin-test-{}", uuid::Uuid::new_v4()))
            .join("config.toml");
        let created = Config::load_or_create(&path).unwrap();
        assert!(path.exists());
        let loaded = Config::load(&path).unwrap();
        assert_eq!(created, loaded);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
