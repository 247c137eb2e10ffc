// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Analysis module - outlier scoring, forecasting and window statistics

mod anomaly;
mod trend;
mod statistics;

pub use anomaly::*;
pub use trend::*;
pub use statistics::*;
