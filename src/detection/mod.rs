// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Detection module - per-tick signals and the remediation verdict

mod decision;

pub use decision::*;

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::analysis::{AnomalyAssessment, AnomalyDetector, Forecast, Trend, TrendPredictor};

/// Urgency attached to a remediation decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        };
        f.write_str(s)
    }
}

/// Combined anomaly and forecast signal for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSignal {
    pub is_anomalous: bool,
    pub anomaly_confidence: f64,
    pub anomaly_reason: String,
    pub predicted_value: Option<f64>,
    pub predicted_confidence: f64,
    pub trend: Trend,
}

impl DetectionSignal {
    pub fn from_parts(anomaly: &AnomalyAssessment, forecast: &Forecast) -> Self {
        Self {
            is_anomalous: anomaly.is_anomalous,
            anomaly_confidence: anomaly.confidence,
            anomaly_reason: anomaly.reason.clone(),
            predicted_value: forecast.predicted_value,
            predicted_confidence: forecast.confidence,
            trend: forecast.trend,
        }
    }
}

/// Runs both detectors over a sensor window. The newest reading is the
/// last element of `history`.
#[derive(Debug, Clone, Default)]
pub struct SignalAnalyzer {
    anomaly_detector: AnomalyDetector,
    trend_predictor: TrendPredictor,
}

impl SignalAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analyze(&self, history: &[f64]) -> (AnomalyAssessment, Forecast) {
        let anomaly = match history.last() {
            Some(&current) => self.anomaly_detector.detect(history, current),
            None => AnomalyAssessment::insufficient(0),
        };
        let forecast = self.trend_predictor.predict(history);
        (anomaly, forecast)
    }

    pub fn signal(&self, history: &[f64]) -> DetectionSignal {
        let (anomaly, forecast) = self.analyze(history);
        DetectionSignal::from_parts(&anomaly, &forecast)
    }
}
