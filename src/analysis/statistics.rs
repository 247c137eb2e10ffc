// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Diagnostic summaries over a sensor's history window

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use super::Trend;

/// Samples needed before insights are reported
pub const MIN_INSIGHT_SAMPLES: usize = 5;

const RECENT_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    Low,
    Medium,
    High,
}

/// Window statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticalSummary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub current: f64,
}

/// Insights for the diagnostic view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SensorInsights {
    InsufficientData {
        data_points: usize,
    },
    Ready {
        data_points: usize,
        statistics: StatisticalSummary,
        recent_trend: Trend,
        volatility: Volatility,
    },
}

/// Statistical analyzer
pub struct StatisticalAnalyzer;

impl StatisticalAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, data: &[f64]) -> StatisticalSummary {
        if data.is_empty() {
            return StatisticalSummary::default();
        }

        StatisticalSummary {
            count: data.len(),
            mean: Statistics::mean(data.iter()),
            std_dev: Statistics::population_std_dev(data.iter()),
            min: Statistics::min(data.iter()),
            max: Statistics::max(data.iter()),
            current: data[data.len() - 1],
        }
    }

    pub fn insights(&self, data: &[f64]) -> SensorInsights {
        if data.len() < MIN_INSIGHT_SAMPLES {
            return SensorInsights::InsufficientData { data_points: data.len() };
        }

        let statistics = self.summarize(data);
        SensorInsights::Ready {
            data_points: data.len(),
            recent_trend: self.recent_trend(data),
            volatility: self.volatility(&statistics),
            statistics,
        }
    }

    /// Compares the halves of the last ten readings; ±10% counts as movement
    pub fn recent_trend(&self, data: &[f64]) -> Trend {
        let window = data.len().min(RECENT_WINDOW);
        if window < 2 {
            return Trend::Stable;
        }
        let recent = &data[data.len() - window..];
        let (first, second) = recent.split_at(window / 2);

        let first_half = Statistics::mean(first.iter());
        let second_half = Statistics::mean(second.iter());

        let change_percent = if first_half > 0.0 {
            (second_half - first_half) / first_half * 100.0
        } else {
            0.0
        };

        if change_percent > 10.0 {
            Trend::Rising
        } else if change_percent < -10.0 {
            Trend::Falling
        } else {
            Trend::Stable
        }
    }

    /// Coefficient of variation banding
    pub fn volatility(&self, summary: &StatisticalSummary) -> Volatility {
        let cv = if summary.mean > 0.0 {
            summary.std_dev / summary.mean * 100.0
        } else {
            0.0
        };

        if cv > 30.0 {
            Volatility::High
        } else if cv > 15.0 {
            Volatility::Medium
        } else {
            Volatility::Low
        }
    }
}

impl Default for StatisticalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_uses_population_std() {
        let analyzer = StatisticalAnalyzer::new();
        let summary = analyzer.summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((summary.mean - 5.0).abs() < 1e-12);
        assert!((summary.std_dev - 2.0).abs() < 1e-12);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 9.0);
        assert_eq!(summary.current, 9.0);
    }

    #[test]
    fn test_insufficient_below_five_samples() {
        let analyzer = StatisticalAnalyzer::new();
        assert_eq!(
            analyzer.insights(&[1.0, 2.0, 3.0, 4.0]),
            SensorInsights::InsufficientData { data_points: 4 }
        );
    }

    #[test]
    fn test_recent_trend_and_volatility() {
        let analyzer = StatisticalAnalyzer::new();
        let rising = [10.0, 10.0, 10.0, 10.0, 10.0, 14.0, 14.0, 14.0, 14.0, 14.0];
        match analyzer.insights(&rising) {
            SensorInsights::Ready { recent_trend, volatility, .. } => {
                assert_eq!(recent_trend, Trend::Rising);
                assert_eq!(volatility, Volatility::Medium);
            }
            other => panic!("unexpected {:?}", other),
        }

        let flat = [50.0; 12];
        match analyzer.insights(&flat) {
            SensorInsights::Ready { recent_trend, volatility, .. } => {
                assert_eq!(recent_trend, Trend::Stable);
                assert_eq!(volatility, Volatility::Low);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
