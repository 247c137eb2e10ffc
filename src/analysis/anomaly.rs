// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Anomaly detection - isolation forest re-fitted on each sensor's window

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Samples required before the outlier model is fitted
pub const MIN_ANOMALY_SAMPLES: usize = 20;

/// Share of the window the model expects to be outliers
pub const CONTAMINATION: f64 = 0.1;

const N_TREES: usize = 100;
const MAX_SAMPLES: usize = 256;
const FOREST_SEED: u64 = 42;
const EULER_GAMMA: f64 = 0.5772156649;

/// Outcome of scoring one reading against its history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyAssessment {
    pub is_anomalous: bool,
    /// 0-100
    pub confidence: f64,
    /// Raw isolation score in (0, 1], higher is more isolated
    pub score: f64,
    pub method: DetectionMethod,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    InsufficientData,
    IsolationForest,
}

impl AnomalyAssessment {
    pub fn insufficient(samples: usize) -> Self {
        Self {
            is_anomalous: false,
            confidence: 0.0,
            score: 0.0,
            method: DetectionMethod::InsufficientData,
            reason: format!("Insufficient data for ML detection ({} samples)", samples),
        }
    }
}

/// Unsupervised outlier detector
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    min_samples: usize,
    contamination: f64,
    n_trees: usize,
}

impl AnomalyDetector {
    pub fn new() -> Self {
        Self {
            min_samples: MIN_ANOMALY_SAMPLES,
            contamination: CONTAMINATION,
            n_trees: N_TREES,
        }
    }

    /// Fit on `history` and score `current` against it
    pub fn detect(&self, history: &[f64], current: f64) -> AnomalyAssessment {
        if history.len() < self.min_samples {
            return AnomalyAssessment::insufficient(history.len());
        }
        if !current.is_finite() || history.iter().any(|v| !v.is_finite()) {
            return AnomalyAssessment::insufficient(0);
        }

        let forest = IsolationForest::fit(history, self.n_trees, FOREST_SEED);

        // Offset so that `contamination` of the training window scores above it
        let mut training: Vec<f64> = history.iter().map(|&x| forest.score(x)).collect();
        training.sort_by(|a, b| a.total_cmp(b));
        let offset = percentile(&training, 100.0 * (1.0 - self.contamination));

        let score = forest.score(current);
        let is_anomalous = score > offset;
        let confidence = (score * 100.0).clamp(0.0, 100.0);

        let reason = if is_anomalous {
            describe_deviation(history, current, score)
        } else {
            "Value within normal range".to_string()
        };

        AnomalyAssessment {
            is_anomalous,
            confidence,
            score,
            method: DetectionMethod::IsolationForest,
            reason,
        }
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new()
    }
}

fn describe_deviation(history: &[f64], current: f64, score: f64) -> String {
    let n = history.len() as f64;
    let mean = history.iter().sum::<f64>() / n;
    let std = (history.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();

    if current > mean + 2.0 * std {
        format!("Value {:.2} significantly higher than normal ({:.2} ± {:.2})", current, mean, std)
    } else if current < mean - 2.0 * std {
        format!("Value {:.2} significantly lower than normal ({:.2} ± {:.2})", current, mean, std)
    } else {
        format!("Unusual pattern detected (anomaly score: {:.3})", score)
    }
}

/// Linear-interpolated percentile of an ascending slice
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let k = p / 100.0 * (sorted.len() - 1) as f64;
    let f = k.floor() as usize;
    let c = k.ceil() as usize;

    if f == c || c >= sorted.len() {
        sorted[f.min(sorted.len() - 1)]
    } else {
        sorted[f] + (sorted[c] - sorted[f]) * (k - f as f64)
    }
}

/// Average path length of an unsuccessful BST search over `n` points
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// One-dimensional isolation forest
struct IsolationForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
}

impl IsolationForest {
    fn fit(data: &[f64], n_trees: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let sample_size = data.len().min(MAX_SAMPLES);

        let trees = (0..n_trees)
            .map(|_| IsolationTree::build(data, sample_size, &mut rng))
            .collect();

        Self { trees, sample_size }
    }

    /// Anomaly score 2^(-E[h(x)] / c(n)); ~0.5 is ordinary, towards 1 is isolated
    fn score(&self, value: f64) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let avg_depth = self.trees.iter()
            .map(|tree| tree.path_length(value))
            .sum::<f64>() / self.trees.len() as f64;

        let c = average_path_length(self.sample_size);
        if c <= 0.0 {
            return 0.5;
        }
        2.0_f64.powf(-avg_depth / c)
    }
}

struct IsolationTree {
    root: IsolationNode,
}

enum IsolationNode {
    Leaf { size: usize },
    Split {
        split_value: f64,
        left: Box<IsolationNode>,
        right: Box<IsolationNode>,
    },
}

impl IsolationTree {
    fn build(data: &[f64], sample_size: usize, rng: &mut ChaCha8Rng) -> Self {
        let sample: Vec<f64> = data.choose_multiple(rng, sample_size.min(data.len()))
            .cloned().collect();

        let max_depth = (sample.len().max(2) as f64).log2().ceil() as usize;

        Self {
            root: Self::build_node(&sample, 0, max_depth, rng),
        }
    }

    fn build_node(data: &[f64], depth: usize, max_depth: usize, rng: &mut ChaCha8Rng) -> IsolationNode {
        if data.len() <= 1 || depth >= max_depth {
            return IsolationNode::Leaf { size: data.len() };
        }

        let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        if (max - min).abs() < 1e-10 {
            return IsolationNode::Leaf { size: data.len() };
        }

        let split_value = rng.gen_range(min..max);

        let left_data: Vec<f64> = data.iter().filter(|&&x| x < split_value).cloned().collect();
        let right_data: Vec<f64> = data.iter().filter(|&&x| x >= split_value).cloned().collect();

        IsolationNode::Split {
            split_value,
            left: Box::new(Self::build_node(&left_data, depth + 1, max_depth, rng)),
            right: Box::new(Self::build_node(&right_data, depth + 1, max_depth, rng)),
        }
    }

    fn path_length(&self, value: f64) -> f64 {
        let mut node = &self.root;
        let mut depth = 0.0;
        loop {
            match node {
                IsolationNode::Leaf { size } => return depth + average_path_length(*size),
                IsolationNode::Split { split_value, left, right } => {
                    node = if value < *split_value { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steady_window(n: usize) -> Vec<f64> {
        (0..n).map(|i| 10.0 + ((i * 7) % 5) as f64 * 0.1).collect()
    }

    #[test]
    fn test_short_history_is_never_anomalous() {
        let detector = AnomalyDetector::new();
        for n in 0..MIN_ANOMALY_SAMPLES {
            let history = vec![1.0; n];
            let result = detector.detect(&history, 1_000.0);
            assert!(!result.is_anomalous);
            assert_eq!(result.confidence, 0.0);
            assert_eq!(result.method, DetectionMethod::InsufficientData);
        }
    }

    #[test]
    fn test_extreme_value_is_flagged() {
        let detector = AnomalyDetector::new();
        let mut history = steady_window(30);
        history.push(100.0);

        let result = detector.detect(&history, 100.0);
        assert!(result.is_anomalous);
        assert!(result.confidence > 70.0, "confidence {}", result.confidence);
        assert!(result.reason.contains("higher than normal"));
    }

    #[test]
    fn test_typical_value_passes() {
        let detector = AnomalyDetector::new();
        let history = steady_window(40);
        let result = detector.detect(&history, 10.2);
        assert!(!result.is_anomalous);
        assert_eq!(result.method, DetectionMethod::IsolationForest);
    }

    #[test]
    fn test_constant_window_is_not_anomalous() {
        let detector = AnomalyDetector::new();
        let history = vec![5.0; 50];
        let result = detector.detect(&history, 5.0);
        assert!(!result.is_anomalous);
        assert!((result.score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_refit_is_deterministic() {
        let detector = AnomalyDetector::new();
        let mut history = steady_window(25);
        history.push(14.0);
        let a = detector.detect(&history, 14.0);
        let b = detector.detect(&history, 14.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_non_finite_input_is_neutral() {
        let detector = AnomalyDetector::new();
        let mut history = steady_window(25);
        history[3] = f64::NAN;
        let result = detector.detect(&history, 10.0);
        assert!(!result.is_anomalous);
        assert_eq!(result.confidence, 0.0);
    }
}
