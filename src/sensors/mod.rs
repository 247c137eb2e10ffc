// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Sensor module - profiles, history windows, simulation and the campus arena

mod traits;
mod history;
mod simulator;
mod campus;

pub use traits::{SensorKind, LocationCategory, SensorStatus, SensorProfile};
pub use history::{HistoryBuffer, HISTORY_CAPACITY};
pub use simulator::{SensorSimulator, FixOverride, InjectionRates, activity_band, activity_multiplier};
pub use campus::{Campus, Location, LocationId, LocationEntry, Sensor, SensorId, default_layout};
