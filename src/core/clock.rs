// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Logical simulation clock

use serde::{Deserialize, Serialize};

/// Point in simulated time handed to the engine on every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimTime {
    pub tick: u64,
    pub hour: u8,
    pub day: u32,
}

impl SimTime {
    pub fn new(tick: u64, hour: u8, day: u32) -> Self {
        Self { tick, hour: hour % 24, day }
    }

    /// Day 0 is a Monday
    pub fn is_weekend(&self) -> bool {
        self.day % 7 >= 5
    }
}

/// Monotonic tick source mapping ticks onto a simulated wall clock
#[derive(Debug, Clone)]
pub struct SimClock {
    tick: u64,
    start_hour: f64,
    seconds_per_tick: f64,
}

impl SimClock {
    pub fn new(start_hour: f64, seconds_per_tick: f64) -> Self {
        Self {
            tick: 0,
            start_hour: start_hour.rem_euclid(24.0),
            seconds_per_tick: seconds_per_tick.max(0.0),
        }
    }

    pub fn now(&self) -> SimTime {
        let hours = self.start_hour + self.tick as f64 * self.seconds_per_tick / 3600.0;
        let day = (hours / 24.0).floor() as u32;
        let hour = hours.rem_euclid(24.0).floor() as u8;
        SimTime::new(self.tick, hour, day)
    }

    pub fn advance(&mut self) -> SimTime {
        self.tick += 1;
        self.now()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }
}
