// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Campus arena - locations and their sensors, addressed by stable ids

use std::collections::HashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::{HistoryBuffer, LocationCategory, SensorKind, SensorProfile, SensorStatus};
use crate::error::{EngineError, EngineResult};
use crate::remediation::RemediationStateMachine;

/// Index of a location in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationId(pub usize);

/// Index of a sensor in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensorId(pub usize);

/// Layout entry for one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub id: String,
    pub name: String,
    pub category: LocationCategory,
}

impl LocationEntry {
    pub fn new(id: &str, name: &str, category: LocationCategory) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
        }
    }
}

/// Campus layout used when none is configured
pub fn default_layout() -> Vec<LocationEntry> {
    vec![
        LocationEntry::new("hostel_1", "Hostel Block A", LocationCategory::Residential),
        LocationEntry::new("hostel_2", "Hostel Block B", LocationCategory::Residential),
        LocationEntry::new("classroom_1", "Classroom Building 1", LocationCategory::Instructional),
        LocationEntry::new("classroom_2", "Classroom Building 2", LocationCategory::Instructional),
        LocationEntry::new("washroom_1", "Main Washroom Block", LocationCategory::Sanitary),
        LocationEntry::new("washroom_2", "Library Washroom", LocationCategory::Sanitary),
        LocationEntry::new("lab_1", "Computer Lab", LocationCategory::Laboratory),
        LocationEntry::new("lab_2", "Physics Lab", LocationCategory::Laboratory),
        LocationEntry::new("canteen_1", "Main Canteen", LocationCategory::Dining),
    ]
}

#[derive(Debug, Clone)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub category: LocationCategory,
    pub sensors: Vec<SensorId>,
}

/// Live state of one sensor. Mutated only by the tick driver.
#[derive(Debug, Clone)]
pub struct Sensor {
    pub location: LocationId,
    pub profile: SensorProfile,
    pub value: f64,
    pub history: HistoryBuffer,
    pub remediation: RemediationStateMachine,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) forced_value: Option<f64>,
}

impl Sensor {
    fn new(location: LocationId, profile: SensorProfile, seed: u64) -> Self {
        Self {
            location,
            profile,
            value: profile.initial_value(),
            history: HistoryBuffer::new(),
            remediation: RemediationStateMachine::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            forced_value: None,
        }
    }

    pub fn kind(&self) -> SensorKind {
        self.profile.kind
    }

    pub fn threshold(&self) -> f64 {
        self.profile.threshold
    }

    pub fn status(&self) -> SensorStatus {
        self.remediation.status()
    }
}

/// Owned collection of every location and sensor
#[derive(Debug, Clone)]
pub struct Campus {
    locations: Vec<Location>,
    sensors: Vec<Sensor>,
    index: HashMap<String, LocationId>,
}

impl Campus {
    /// Build the arena. Each sensor gets its own noise stream derived from
    /// `seed`, so results do not depend on processing order. Duplicate ids
    /// keep the first entry.
    pub fn new(layout: &[LocationEntry], seed: u64) -> Self {
        let mut campus = Self {
            locations: Vec::with_capacity(layout.len()),
            sensors: Vec::new(),
            index: HashMap::new(),
        };

        for entry in layout {
            if campus.index.contains_key(&entry.id) {
                continue;
            }
            let location_id = LocationId(campus.locations.len());
            let mut sensor_ids = Vec::new();

            for kind in entry.category.sensor_kinds() {
                let sensor_id = SensorId(campus.sensors.len());
                let sensor_seed = seed ^ (sensor_id.0 as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
                let profile = SensorProfile::new(entry.category, kind);
                campus.sensors.push(Sensor::new(location_id, profile, sensor_seed));
                sensor_ids.push(sensor_id);
            }

            campus.index.insert(entry.id.clone(), location_id);
            campus.locations.push(Location {
                id: entry.id.clone(),
                name: entry.name.clone(),
                category: entry.category,
                sensors: sensor_ids,
            });
        }

        campus
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn location(&self, id: LocationId) -> &Location {
        &self.locations[id.0]
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn sensor(&self, id: SensorId) -> &Sensor {
        &self.sensors[id.0]
    }

    pub fn sensor_mut(&mut self, id: SensorId) -> &mut Sensor {
        &mut self.sensors[id.0]
    }

    pub fn sensor_ids(&self) -> impl Iterator<Item = SensorId> {
        (0..self.sensors.len()).map(SensorId)
    }

    pub fn find_location(&self, location: &str) -> EngineResult<LocationId> {
        self.index
            .get(location)
            .copied()
            .ok_or_else(|| EngineError::UnknownLocation(location.to_string()))
    }

    /// Resolve a (location, kind) pair, rejecting unknown targets
    pub fn resolve(&self, location: &str, kind: SensorKind) -> EngineResult<SensorId> {
        let location_id = self.find_location(location)?;
        self.locations[location_id.0]
            .sensors
            .iter()
            .copied()
            .find(|id| self.sensors[id.0].kind() == kind)
            .ok_or_else(|| EngineError::UnknownSensor {
                location: location.to_string(),
                kind,
            })
    }
}
