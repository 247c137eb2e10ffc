// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Sensor kinds, location categories and the profile tables that drive them

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Sensor kinds hosted by campus locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    PowerDraw,   // Current clamp on the distribution board
    FlowRate,    // Inline water flow meter
    FillLevel,   // Ultrasonic bin level
}

impl SensorKind {
    pub const ALL: [SensorKind; 3] = [SensorKind::PowerDraw, SensorKind::FlowRate, SensorKind::FillLevel];

    pub fn unit(&self) -> &'static str {
        match self {
            SensorKind::PowerDraw => "W",
            SensorKind::FlowRate => "L/min",
            SensorKind::FillLevel => "%",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::PowerDraw => "power_draw",
            SensorKind::FlowRate => "flow_rate",
            SensorKind::FillLevel => "fill_level",
        }
    }

    /// Corrective action applied while a fix is running
    pub fn fix_action(&self) -> &'static str {
        match self {
            SensorKind::PowerDraw => "Circuit isolated",
            SensorKind::FlowRate => "Solenoid valve closed",
            SensorKind::FillLevel => "Pneumatic compressor activated",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "power_draw" | "power" | "energy" => Ok(SensorKind::PowerDraw),
            "flow_rate" | "flow" | "water" => Ok(SensorKind::FlowRate),
            "fill_level" | "fill" | "waste" => Ok(SensorKind::FillLevel),
            other => Err(format!("unknown sensor kind '{}'", other)),
        }
    }
}

/// Location categories on campus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationCategory {
    Residential,    // Hostels
    Instructional,  // Classrooms
    Sanitary,       // Washrooms
    Laboratory,     // Labs
    Dining,         // Canteens
}

impl LocationCategory {
    /// Sensor kinds installed in this category of location
    pub fn sensor_kinds(&self) -> Vec<SensorKind> {
        match self {
            LocationCategory::Residential | LocationCategory::Sanitary | LocationCategory::Dining => {
                vec![SensorKind::PowerDraw, SensorKind::FlowRate, SensorKind::FillLevel]
            }
            LocationCategory::Instructional | LocationCategory::Laboratory => {
                vec![SensorKind::PowerDraw, SensorKind::FillLevel]
            }
        }
    }

    pub fn hosts(&self, kind: SensorKind) -> bool {
        self.sensor_kinds().contains(&kind)
    }
}

/// Sensor status, mirrored from the remediation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorStatus {
    Normal,
    AnomalyDetected,
    AutoFixing,
    Fixed,
}

/// Static per-sensor configuration derived from (category, kind)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorProfile {
    pub kind: SensorKind,
    pub category: LocationCategory,
    pub normal_range: (f64, f64),
    pub threshold: f64,
    pub bounds: (f64, f64),
}

impl SensorProfile {
    pub fn new(category: LocationCategory, kind: SensorKind) -> Self {
        let normal_range = match kind {
            SensorKind::PowerDraw => match category {
                LocationCategory::Residential => (100.0, 300.0),
                LocationCategory::Instructional => (200.0, 500.0),
                LocationCategory::Sanitary => (50.0, 150.0),
                LocationCategory::Laboratory => (300.0, 800.0),
                LocationCategory::Dining => (400.0, 1000.0),
            },
            SensorKind::FlowRate => match category {
                LocationCategory::Sanitary => (2.0, 8.0),
                LocationCategory::Dining => (5.0, 15.0),
                LocationCategory::Residential => (3.0, 10.0),
                _ => (2.0, 8.0),
            },
            SensorKind::FillLevel => (0.0, 70.0),
        };

        // Surge at 150% of max normal, leak at 200%, overflow at a fixed 80%
        let threshold = match kind {
            SensorKind::PowerDraw => normal_range.1 * 1.5,
            SensorKind::FlowRate => normal_range.1 * 2.0,
            SensorKind::FillLevel => 80.0,
        };

        let bounds = match kind {
            SensorKind::FillLevel => (0.0, 100.0),
            _ => (0.0, threshold * 2.0),
        };

        Self { kind, category, normal_range, threshold, bounds }
    }

    pub fn unit(&self) -> &'static str {
        self.kind.unit()
    }

    pub fn clamp(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.bounds.0;
        }
        value.clamp(self.bounds.0, self.bounds.1)
    }

    /// Reading reported before the first tick
    pub fn initial_value(&self) -> f64 {
        match self.kind {
            SensorKind::FillLevel => 0.0,
            _ => (self.normal_range.0 + self.normal_range.1) / 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_follow_profile_table() {
        let hostel_water = SensorProfile::new(LocationCategory::Residential, SensorKind::FlowRate);
        assert_eq!(hostel_water.threshold, 20.0);
        assert_eq!(hostel_water.unit(), "L/min");

        let lab_power = SensorProfile::new(LocationCategory::Laboratory, SensorKind::PowerDraw);
        assert_eq!(lab_power.threshold, 1200.0);

        let bin = SensorProfile::new(LocationCategory::Dining, SensorKind::FillLevel);
        assert_eq!(bin.threshold, 80.0);
        assert_eq!(bin.bounds, (0.0, 100.0));
    }

    #[test]
    fn test_clamp_never_negative() {
        let profile = SensorProfile::new(LocationCategory::Sanitary, SensorKind::FlowRate);
        assert_eq!(profile.clamp(-3.0), 0.0);
        assert_eq!(profile.clamp(f64::NAN), 0.0);
        assert_eq!(profile.clamp(1_000.0), profile.threshold * 2.0);
    }

    #[test]
    fn test_flow_sensors_only_where_water_is_used() {
        assert!(LocationCategory::Dining.hosts(SensorKind::FlowRate));
        assert!(!LocationCategory::Laboratory.hosts(SensorKind::FlowRate));
        assert!(LocationCategory::Instructional.hosts(SensorKind::PowerDraw));
    }

    #[test]
    fn test_kind_parsing_accepts_resource_aliases() {
        assert_eq!("water".parse::<SensorKind>().unwrap(), SensorKind::FlowRate);
        assert_eq!("power_draw".parse::<SensorKind>().unwrap(), SensorKind::PowerDraw);
        assert!("humidity".parse::<SensorKind>().is_err());
    }
}
