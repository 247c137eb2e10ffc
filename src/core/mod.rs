// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Core engine module - tick driver, published state and events

mod clock;
mod engine;
mod scheduler;
mod event_bus;

pub use clock::{SimClock, SimTime};
pub use engine::{Engine, EngineHandle, TickReport};
pub use scheduler::Scheduler;
pub use event_bus::{EventBus, EngineEvent};

use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::remediation::MetricsSnapshot;
use crate::sensors::{LocationCategory, SensorKind, SensorStatus};

/// Detection counters since start
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionStats {
    pub total_anomalies_detected: u64,
    pub total_predictions_made: u64,
    pub fixes_triggered: u64,
    pub sensors_tracked: usize,
    pub total_data_points: usize,
}

/// One sensor as seen by readers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSnapshot {
    pub kind: SensorKind,
    pub unit: &'static str,
    pub value: f64,
    pub threshold: f64,
    pub status: SensorStatus,
    #[serde(skip_serializing)]
    pub history: Arc<[f64]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSnapshot {
    pub id: String,
    pub name: String,
    pub category: LocationCategory,
    pub sensors: Vec<SensorSnapshot>,
    pub auto_fix_active: bool,
}

impl LocationSnapshot {
    pub fn sensor(&self, kind: SensorKind) -> Option<&SensorSnapshot> {
        self.sensors.iter().find(|s| s.kind == kind)
    }
}

/// Full campus state published after every tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CampusSnapshot {
    pub tick: u64,
    pub timestamp: DateTime<Utc>,
    pub hour: u8,
    pub day: u32,
    pub locations: Vec<LocationSnapshot>,
    pub metrics: MetricsSnapshot,
    pub detection_stats: DetectionStats,
    pub total_locations: usize,
}

impl CampusSnapshot {
    pub fn location(&self, id: &str) -> Option<&LocationSnapshot> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn sensor(&self, location: &str, kind: SensorKind) -> Option<&SensorSnapshot> {
        self.location(location).and_then(|l| l.sensor(kind))
    }
}

/// Entry of the location listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub id: String,
    pub name: String,
    pub category: LocationCategory,
    pub sensors: Vec<SensorKind>,
}
