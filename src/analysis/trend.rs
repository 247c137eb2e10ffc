// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Short-horizon forecasting with an ordinary least-squares line

use serde::{Deserialize, Serialize};

/// Samples required before a forecast is attempted
pub const MIN_TREND_SAMPLES: usize = 10;

/// Steps ahead of the newest sample
pub const FORECAST_HORIZON: usize = 10;

/// Slope magnitude per step that counts as movement
const SLOPE_DEADBAND: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl Trend {
    pub fn from_slope(slope: f64) -> Self {
        if slope > SLOPE_DEADBAND {
            Trend::Rising
        } else if slope < -SLOPE_DEADBAND {
            Trend::Falling
        } else {
            Trend::Stable
        }
    }
}

/// Forecast for one sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub predicted_value: Option<f64>,
    /// R² scaled to 0-100
    pub confidence: f64,
    pub trend: Trend,
    pub slope: f64,
    pub r_squared: f64,
    pub steps_ahead: usize,
}

impl Forecast {
    pub fn none() -> Self {
        Self {
            predicted_value: None,
            confidence: 0.0,
            trend: Trend::Stable,
            slope: 0.0,
            r_squared: 0.0,
            steps_ahead: FORECAST_HORIZON,
        }
    }
}

/// Linear trend fit over value vs. sample index
#[derive(Debug, Clone)]
pub struct TrendPredictor {
    min_samples: usize,
    horizon: usize,
}

impl TrendPredictor {
    pub fn new() -> Self {
        Self {
            min_samples: MIN_TREND_SAMPLES,
            horizon: FORECAST_HORIZON,
        }
    }

    pub fn predict(&self, history: &[f64]) -> Forecast {
        if history.len() < self.min_samples || history.iter().any(|v| !v.is_finite()) {
            return Forecast::none();
        }

        let (slope, intercept, r_squared) = linear_fit(history);

        let future_x = (history.len() + self.horizon) as f64;
        let predicted = intercept + slope * future_x;

        Forecast {
            predicted_value: Some(predicted),
            confidence: (r_squared * 100.0).clamp(0.0, 100.0),
            trend: Trend::from_slope(slope),
            slope,
            r_squared,
            steps_ahead: self.horizon,
        }
    }
}

impl Default for TrendPredictor {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns (slope, intercept, r²). A zero-variance series gives slope 0 and r² 0.
pub fn linear_fit(y: &[f64]) -> (f64, f64, f64) {
    let n = y.len();
    if n == 0 {
        return (0.0, 0.0, 0.0);
    }

    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = y.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut ss_tot = 0.0;
    for (i, &yi) in y.iter().enumerate() {
        let dx = i as f64 - x_mean;
        let dy = yi - y_mean;
        sxx += dx * dx;
        sxy += dx * dy;
        ss_tot += dy * dy;
    }

    if sxx < 1e-12 || ss_tot < 1e-12 {
        return (0.0, y_mean, 0.0);
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let ss_res: f64 = y.iter().enumerate()
        .map(|(i, &yi)| (yi - (intercept + slope * i as f64)).powi(2))
        .sum();

    (slope, intercept, 1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_history_has_no_prediction() {
        let predictor = TrendPredictor::new();
        for n in 0..MIN_TREND_SAMPLES {
            let history: Vec<f64> = (0..n).map(|i| i as f64).collect();
            let forecast = predictor.predict(&history);
            assert!(forecast.predicted_value.is_none());
            assert_eq!(forecast.confidence, 0.0);
        }
    }

    #[test]
    fn test_rising_series() {
        let predictor = TrendPredictor::new();
        let history: Vec<f64> = (0..20).map(|i| 100.0 + 2.0 * i as f64).collect();
        let forecast = predictor.predict(&history);

        assert_eq!(forecast.trend, Trend::Rising);
        assert!((forecast.r_squared - 1.0).abs() < 1e-9);
        assert!((forecast.confidence - 100.0).abs() < 1e-6);
        // x = 20 + 10
        let predicted = forecast.predicted_value.unwrap();
        assert!((predicted - 160.0).abs() < 1e-9);
    }

    #[test]
    fn test_falling_series() {
        let predictor = TrendPredictor::new();
        let history: Vec<f64> = (0..15).map(|i| 50.0 - 0.5 * i as f64).collect();
        assert_eq!(predictor.predict(&history).trend, Trend::Falling);
    }

    #[test]
    fn test_flat_series_is_stable_without_fault() {
        let predictor = TrendPredictor::new();
        let forecast = predictor.predict(&[7.5; 30]);

        assert_eq!(forecast.trend, Trend::Stable);
        assert_eq!(forecast.slope, 0.0);
        assert_eq!(forecast.confidence, 0.0);
        assert_eq!(forecast.predicted_value, Some(7.5));
    }

    #[test]
    fn test_slow_drift_counts_as_stable() {
        let predictor = TrendPredictor::new();
        let history: Vec<f64> = (0..30).map(|i| 20.0 + 0.05 * i as f64).collect();
        let forecast = predictor.predict(&history);
        assert_eq!(forecast.trend, Trend::Stable);
        assert!(forecast.confidence > 99.0);
    }
}
