// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Fix / no-fix policy

use serde::{Deserialize, Serialize};

use super::{DetectionSignal, Urgency};

/// Anomaly confidence above which an anomaly alone justifies a fix
pub const ANOMALY_CONFIDENCE_TRIGGER: f64 = 70.0;

/// Verdict for one sensor on one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationDecision {
    pub should_fix: bool,
    pub urgency: Urgency,
    pub reason: String,
    pub estimated_impact: f64,
    pub rule: DecisionRule,
}

/// Which rule produced the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    ThresholdBreach,
    ConfidentAnomaly,
    PredictedBreach,
    NoAction,
}

impl RemediationDecision {
    pub fn no_fix() -> Self {
        Self {
            should_fix: false,
            urgency: Urgency::Low,
            reason: String::new(),
            estimated_impact: 0.0,
            rule: DecisionRule::NoAction,
        }
    }
}

/// Stateless rule evaluation in fixed priority order: threshold breach,
/// confident anomaly, predicted breach. The anomaly rule is checked before
/// the prediction rule; keep that order.
#[derive(Debug, Clone, Default)]
pub struct RemediationDecisionEngine;

impl RemediationDecisionEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn decide(&self, current: f64, threshold: f64, signal: &DetectionSignal) -> RemediationDecision {
        if current > threshold {
            return RemediationDecision {
                should_fix: true,
                urgency: Urgency::High,
                reason: format!("Threshold breach: {:.2} > {:.2}", current, threshold),
                estimated_impact: (current - threshold) * 10.0,
                rule: DecisionRule::ThresholdBreach,
            };
        }

        if signal.is_anomalous && signal.anomaly_confidence > ANOMALY_CONFIDENCE_TRIGGER {
            return RemediationDecision {
                should_fix: true,
                urgency: Urgency::Medium,
                reason: format!("AI anomaly detection: {}", signal.anomaly_reason),
                estimated_impact: current * 0.5,
                rule: DecisionRule::ConfidentAnomaly,
            };
        }

        if let Some(predicted) = signal.predicted_value {
            if predicted > threshold {
                return RemediationDecision {
                    should_fix: true,
                    urgency: Urgency::Medium,
                    reason: format!("Predictive alert: will reach {:.2} (threshold: {:.2})", predicted, threshold),
                    estimated_impact: (predicted - threshold) * 5.0,
                    rule: DecisionRule::PredictedBreach,
                };
            }
        }

        RemediationDecision::no_fix()
    }
}
