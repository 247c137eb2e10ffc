// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Per-sensor remediation lifecycle

use serde::{Deserialize, Serialize};

use crate::detection::RemediationDecision;
use crate::sensors::{FixOverride, SensorStatus};

/// Ticks a fix keeps the sensor under override
pub const FIX_DURATION_TICKS: u32 = 5;

/// Ticks the `Fixed` status is shown before evaluation resumes
pub const FIXED_HOLD_TICKS: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Phase {
    Normal,
    AutoFixing {
        decision: RemediationDecision,
        target: f64,
        remaining: u32,
    },
    Fixed {
        hold: u32,
    },
}

/// Transition produced by a lifecycle step
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Normal -> AnomalyDetected -> AutoFixing
    FixStarted { decision: RemediationDecision },
    /// AutoFixing -> Fixed
    FixCompleted { decision: RemediationDecision },
    /// Fixed -> Normal
    Released,
}

/// Normal -> AnomalyDetected -> AutoFixing -> Fixed -> Normal.
///
/// `AnomalyDetected` is passed through within the tick that receives a
/// positive verdict, so it never persists between ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationStateMachine {
    phase: Phase,
    fix_duration: u32,
    hold_duration: u32,
}

impl RemediationStateMachine {
    pub fn new() -> Self {
        Self {
            phase: Phase::Normal,
            fix_duration: FIX_DURATION_TICKS,
            hold_duration: FIXED_HOLD_TICKS,
        }
    }

    pub fn status(&self) -> SensorStatus {
        match self.phase {
            Phase::Normal => SensorStatus::Normal,
            Phase::AutoFixing { .. } => SensorStatus::AutoFixing,
            Phase::Fixed { .. } => SensorStatus::Fixed,
        }
    }

    /// Only a sensor in `Normal` is evaluated for new decisions
    pub fn accepts_decisions(&self) -> bool {
        matches!(self.phase, Phase::Normal)
    }

    pub fn is_fixing(&self) -> bool {
        matches!(self.phase, Phase::AutoFixing { .. })
    }

    /// Override for the reading generated this tick, if a fix is running
    pub fn fix_override(&self) -> Option<FixOverride> {
        match self.phase {
            Phase::AutoFixing { target, remaining, .. } => Some(FixOverride {
                target,
                remaining_ticks: remaining,
            }),
            _ => None,
        }
    }

    /// Apply a verdict. Returns `None` when the verdict is negative or the
    /// sensor is not in `Normal`; only one fix runs per sensor.
    pub fn apply(&mut self, decision: RemediationDecision, target: f64) -> Option<Transition> {
        if !decision.should_fix || !self.accepts_decisions() {
            return None;
        }

        self.phase = Phase::AutoFixing {
            decision: decision.clone(),
            target,
            remaining: self.fix_duration,
        };
        Some(Transition::FixStarted { decision })
    }

    /// Advance timers by one tick
    pub fn advance(&mut self) -> Option<Transition> {
        match &mut self.phase {
            Phase::Normal => None,
            Phase::AutoFixing { decision, remaining, .. } => {
                *remaining = remaining.saturating_sub(1);
                if *remaining > 0 {
                    return None;
                }
                let decision = decision.clone();
                self.phase = Phase::Fixed { hold: self.hold_duration };
                Some(Transition::FixCompleted { decision })
            }
            Phase::Fixed { hold } => {
                *hold = hold.saturating_sub(1);
                if *hold > 0 {
                    return None;
                }
                self.phase = Phase::Normal;
                Some(Transition::Released)
            }
        }
    }
}

impl Default for RemediationStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{DecisionRule, Urgency};

    fn positive() -> RemediationDecision {
        RemediationDecision {
            should_fix: true,
            urgency: Urgency::High,
            reason: "Threshold breach".to_string(),
            estimated_impact: 50.0,
            rule: DecisionRule::ThresholdBreach,
        }
    }

    #[test]
    fn test_full_lifecycle_takes_six_ticks() {
        let mut sm = RemediationStateMachine::new();
        assert_eq!(sm.status(), SensorStatus::Normal);

        assert!(matches!(sm.apply(positive(), 0.0), Some(Transition::FixStarted { .. })));
        assert_eq!(sm.status(), SensorStatus::AutoFixing);

        for _ in 0..4 {
            assert_eq!(sm.advance(), None);
            assert_eq!(sm.status(), SensorStatus::AutoFixing);
        }
        match sm.advance() {
            Some(Transition::FixCompleted { decision }) => assert_eq!(decision.estimated_impact, 50.0),
            other => panic!("expected completion, got {:?}", other),
        }
        assert_eq!(sm.status(), SensorStatus::Fixed);

        assert_eq!(sm.advance(), Some(Transition::Released));
        assert_eq!(sm.status(), SensorStatus::Normal);
        assert_eq!(sm.advance(), None);
    }

    #[test]
    fn test_no_overlapping_fixes() {
        let mut sm = RemediationStateMachine::new();
        sm.apply(positive(), 0.0);
        assert_eq!(sm.apply(positive(), 0.0), None);
        sm.advance();
        assert_eq!(sm.fix_override().map(|f| f.remaining_ticks), Some(FIX_DURATION_TICKS - 1));
    }

    #[test]
    fn test_negative_verdict_keeps_normal() {
        let mut sm = RemediationStateMachine::new();
        assert_eq!(sm.apply(RemediationDecision::no_fix(), 0.0), None);
        assert!(sm.accepts_decisions());
        assert!(sm.fix_override().is_none());
    }
}
