// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Remediation module - fix lifecycle, alerts and savings accounting

mod state_machine;
mod alert;
mod metrics;

pub use state_machine::*;
pub use alert::*;
pub use metrics::*;
