// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Engine error types

use thiserror::Error;

use crate::sensors::SensorKind;

/// Rejected requests against the campus engine. Each one is scoped to a
/// single sensor and leaves every other sensor untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("unknown location '{0}'")]
    UnknownLocation(String),

    #[error("location '{location}' has no {kind} sensor")]
    UnknownSensor { location: String, kind: SensorKind },

    #[error("a fix is already in progress for {kind} at '{location}'")]
    FixInProgress { location: String, kind: SensorKind },

    #[error("engine is no longer running")]
    EngineStopped,
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
