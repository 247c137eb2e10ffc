// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! EcoTwin - Campus Digital Twin
//!
//! A simulated facility-monitoring loop for a university campus:
//! - Synthetic power, water and waste sensors with daily activity patterns
//! - Isolation-forest anomaly scoring over a rolling window
//! - Least-squares short-horizon forecasting
//! - Automatic remediation with a per-sensor fix lifecycle
//! - Water, energy and waste savings with CO2 equivalents
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      EcoTwin Engine                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────┐  ┌───────────┐  ┌───────────┐  │
//! │  │ Simulator │→ │ History  │→ │ Analysis  │→ │ Decision  │  │
//! │  │           │  │ Buffer   │  │ IF + OLS  │  │ Engine    │  │
//! │  └───────────┘  └──────────┘  └───────────┘  └───────────┘  │
//! │        ↑                                           ↓        │
//! │  ┌───────────────────────┐        ┌─────────────────────┐   │
//! │  │ Remediation lifecycle │ ←───── │ Alerts + Metrics    │   │
//! │  └───────────────────────┘        └─────────────────────┘   │
//! │                         ↓                                   │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │           Event Bus / published snapshot            │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod core;
pub mod sensors;
pub mod analysis;
pub mod detection;
pub mod remediation;
pub mod config;
pub mod error;

// Re-exports for convenience
pub use config::Config;
pub use self::core::{CampusSnapshot, Engine, EngineEvent, EngineHandle, EventBus, Scheduler, SimClock, SimTime};
pub use error::{EngineError, EngineResult};
pub use sensors::{SensorKind, SensorStatus, LocationCategory};
pub use detection::{RemediationDecision, Urgency};
pub use remediation::{Alert, MetricsSnapshot};

/// EcoTwin version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// EcoTwin name
pub const NAME: &str = "EcoTwin";
