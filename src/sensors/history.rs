// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Rolling window of recent readings for one sensor

use std::collections::VecDeque;

/// Readings kept per sensor
pub const HISTORY_CAPACITY: usize = 100;

/// Bounded, insertion-ordered window; the oldest reading is evicted on overflow
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    values: VecDeque<f64>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Owned copy of the window, oldest first
    pub fn snapshot(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<f64> {
        self.values.back().copied()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_evicts_oldest_first() {
        let mut buffer = HistoryBuffer::with_capacity(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            buffer.append(v);
        }
        assert_eq!(buffer.snapshot(), vec![2.0, 3.0, 4.0]);
        assert_eq!(buffer.latest(), Some(4.0));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut buffer = HistoryBuffer::new();
        buffer.append(1.0);
        let mut copy = buffer.snapshot();
        copy.push(99.0);
        assert_eq!(buffer.size(), 1);
    }

    proptest! {
        #[test]
        fn size_never_exceeds_capacity(values in prop::collection::vec(-1e6f64..1e6, 0..400)) {
            let mut buffer = HistoryBuffer::new();
            for v in &values {
                buffer.append(*v);
                prop_assert!(buffer.size() <= HISTORY_CAPACITY);
            }
            prop_assert_eq!(buffer.size(), values.len().min(HISTORY_CAPACITY));
        }
    }
}
