// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Alert records and the bounded alert log

use std::collections::VecDeque;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::detection::{RemediationDecision, Urgency};
use crate::sensors::SensorKind;

/// Default number of alerts retained
pub const DEFAULT_ALERT_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Fixing,
    Completed,
}

/// Immutable record of a fix starting or finishing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub tick: u64,
    pub location_id: String,
    pub location_name: String,
    pub sensor_kind: SensorKind,
    pub reason: String,
    pub urgency: Urgency,
    pub action: String,
    pub status: AlertStatus,
    /// Credited impact, set on completion only
    pub saved_amount: Option<f64>,
}

impl Alert {
    pub fn fixing(
        tick: u64,
        location_id: &str,
        location_name: &str,
        kind: SensorKind,
        decision: &RemediationDecision,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            tick,
            location_id: location_id.to_string(),
            location_name: location_name.to_string(),
            sensor_kind: kind,
            reason: decision.reason.clone(),
            urgency: decision.urgency,
            action: format!("Auto-fix triggered: {}", kind.fix_action()),
            status: AlertStatus::Fixing,
            saved_amount: None,
        }
    }

    pub fn completed(
        tick: u64,
        location_id: &str,
        location_name: &str,
        kind: SensorKind,
        decision: &RemediationDecision,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            tick,
            location_id: location_id.to_string(),
            location_name: location_name.to_string(),
            sensor_kind: kind,
            reason: decision.reason.clone(),
            urgency: decision.urgency,
            action: format!("Auto-fix completed: {}", kind.fix_action()),
            status: AlertStatus::Completed,
            saved_amount: Some(decision.estimated_impact.max(0.0)),
        }
    }
}

/// Capped alert history, newest first
#[derive(Debug, Clone)]
pub struct AlertLog {
    alerts: VecDeque<Alert>,
    capacity: usize,
    total: u64,
}

impl AlertLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            alerts: VecDeque::with_capacity(capacity),
            capacity,
            total: 0,
        }
    }

    pub fn push(&mut self, alert: Alert) {
        self.alerts.push_front(alert);
        if self.alerts.len() > self.capacity {
            self.alerts.pop_back();
        }
        self.total += 1;
    }

    pub fn recent(&self, limit: usize) -> Vec<Alert> {
        self.alerts.iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Alerts ever recorded, including evicted ones
    pub fn total(&self) -> u64 {
        self.total
    }
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::DecisionRule;

    fn decision() -> RemediationDecision {
        RemediationDecision {
            should_fix: true,
            urgency: Urgency::Medium,
            reason: "Predictive alert".to_string(),
            estimated_impact: 12.5,
            rule: DecisionRule::PredictedBreach,
        }
    }

    #[test]
    fn test_log_is_newest_first_and_capped() {
        let mut log = AlertLog::new(3);
        for tick in 0..5 {
            log.push(Alert::fixing(tick, "lab_1", "Computer Lab", SensorKind::PowerDraw, &decision()));
        }
        let recent = log.recent(10);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].tick, 4);
        assert_eq!(recent[2].tick, 2);
        assert_eq!(log.total(), 5);
        assert_eq!(log.recent(1)[0].tick, 4);
    }

    #[test]
    fn test_completion_is_a_new_record() {
        let d = decision();
        let start = Alert::fixing(1, "washroom_1", "Main Washroom Block", SensorKind::FlowRate, &d);
        let done = Alert::completed(6, "washroom_1", "Main Washroom Block", SensorKind::FlowRate, &d);

        assert_ne!(start.id, done.id);
        assert_eq!(start.status, AlertStatus::Fixing);
        assert_eq!(start.saved_amount, None);
        assert_eq!(done.status, AlertStatus::Completed);
        assert_eq!(done.saved_amount, Some(12.5));
        assert!(start.action.contains("Solenoid valve closed"));
    }
}
