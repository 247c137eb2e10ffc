// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Resource savings accounting and environmental impact

use std::time::Instant;
use serde::{Deserialize, Serialize};

use crate::sensors::SensorKind;

/// kg CO2 per litre of water (treatment and pumping)
pub const CO2_KG_PER_LITRE: f64 = 0.001;
/// kg CO2 per kWh (grid average)
pub const CO2_KG_PER_KWH: f64 = 0.82;
/// kg CO2 per percentage point of bin volume, taking 1% as 1 kg
pub const CO2_KG_PER_WASTE_PCT: f64 = 0.5;
/// kg CO2 absorbed by one tree in a year
pub const CO2_KG_PER_TREE_YEAR: f64 = 21.0;

/// Running totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SavingsTotals {
    pub water_saved_liters: f64,
    pub energy_saved_kwh: f64,
    pub waste_reduced_percent: f64,
    pub total_fixes: u64,
}

/// Emissions avoided, derived from the totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalImpact {
    pub water_co2_kg: f64,
    pub energy_co2_kg: f64,
    pub waste_co2_kg: f64,
    pub total_co2_saved_kg: f64,
    pub trees_equivalent: f64,
}

impl EnvironmentalImpact {
    pub fn from_totals(totals: &SavingsTotals) -> Self {
        let water_co2_kg = totals.water_saved_liters * CO2_KG_PER_LITRE;
        let energy_co2_kg = totals.energy_saved_kwh * CO2_KG_PER_KWH;
        let waste_co2_kg = totals.waste_reduced_percent * CO2_KG_PER_WASTE_PCT;
        let total_co2_saved_kg = water_co2_kg + energy_co2_kg + waste_co2_kg;

        Self {
            water_co2_kg,
            energy_co2_kg,
            waste_co2_kg,
            total_co2_saved_kg,
            trees_equivalent: total_co2_saved_kg / CO2_KG_PER_TREE_YEAR,
        }
    }
}

/// Published view of the metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(flatten)]
    pub totals: SavingsTotals,
    pub uptime_seconds: u64,
    pub impact: EnvironmentalImpact,
}

/// Accumulates savings from completed fixes. Totals only ever grow.
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    totals: SavingsTotals,
    started_at: Instant,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self {
            totals: SavingsTotals::default(),
            started_at: Instant::now(),
        }
    }

    /// Credit a completed fix. Power impact is in watts and is booked as kWh.
    pub fn record_fix(&mut self, kind: SensorKind, estimated_impact: f64) {
        let amount = if estimated_impact.is_finite() { estimated_impact.max(0.0) } else { 0.0 };

        match kind {
            SensorKind::FlowRate => self.totals.water_saved_liters += amount,
            SensorKind::PowerDraw => self.totals.energy_saved_kwh += amount / 1000.0,
            SensorKind::FillLevel => self.totals.waste_reduced_percent += amount,
        }
        self.totals.total_fixes += 1;
    }

    pub fn totals(&self) -> SavingsTotals {
        self.totals
    }

    pub fn environmental_impact(&self) -> EnvironmentalImpact {
        EnvironmentalImpact::from_totals(&self.totals)
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            totals: self.totals,
            uptime_seconds: self.uptime_seconds(),
            impact: self.environmental_impact(),
        }
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_credit_by_kind() {
        let mut metrics = MetricsAggregator::new();
        metrics.record_fix(SensorKind::FlowRate, 50.0);
        metrics.record_fix(SensorKind::PowerDraw, 2_000.0);
        metrics.record_fix(SensorKind::FillLevel, 30.0);

        let totals = metrics.totals();
        assert_eq!(totals.water_saved_liters, 50.0);
        assert_eq!(totals.energy_saved_kwh, 2.0);
        assert_eq!(totals.waste_reduced_percent, 30.0);
        assert_eq!(totals.total_fixes, 3);
    }

    #[test]
    fn test_impact_is_side_effect_free() {
        let mut metrics = MetricsAggregator::new();
        metrics.record_fix(SensorKind::PowerDraw, 10_000.0);

        let first = metrics.environmental_impact();
        let second = metrics.environmental_impact();
        assert_eq!(first, second);
        assert!((first.energy_co2_kg - 8.2).abs() < 1e-9);
        assert!((first.trees_equivalent - 8.2 / 21.0).abs() < 1e-9);
        assert_eq!(metrics.totals().total_fixes, 1);
    }

    proptest! {
        #[test]
        fn totals_never_decrease(credits in prop::collection::vec((0usize..3, -100.0f64..1_000.0), 1..60)) {
            let mut metrics = MetricsAggregator::new();
            let mut previous = metrics.totals();
            for (k, impact) in credits {
                metrics.record_fix(SensorKind::ALL[k], impact);
                let now = metrics.totals();
                prop_assert!(now.water_saved_liters >= previous.water_saved_liters);
                prop_assert!(now.energy_saved_kwh >= previous.energy_saved_kwh);
                prop_assert!(now.waste_reduced_percent >= previous.waste_reduced_percent);
                prop_assert!(now.total_fixes > previous.total_fixes);
                previous = now;
            }
        }
    }
}
