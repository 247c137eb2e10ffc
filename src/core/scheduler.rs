// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Periodic tick driver

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::{Engine, SimClock};

/// Advances the simulation clock on a fixed period and runs one engine
/// tick per period until shut down or the tick limit is reached.
pub struct Scheduler {
    clock: SimClock,
    period: Duration,
    max_ticks: Option<u64>,
}

impl Scheduler {
    pub fn new(clock: SimClock, period: Duration) -> Self {
        Self {
            clock,
            period: period.max(Duration::from_millis(1)),
            max_ticks: None,
        }
    }

    /// Stop after `ticks` ticks
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Drive the engine. Returns the number of ticks run. A closed shutdown
    /// channel counts as a shutdown request.
    pub async fn run(&mut self, engine: &mut Engine, mut shutdown: broadcast::Receiver<()>) -> u64 {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Scheduler started: period {:?}, limit {:?}", self.period, self.max_ticks);
        let mut ticks_run = 0u64;

        loop {
            if self.max_ticks.is_some_and(|max| ticks_run >= max) {
                debug!("Tick limit reached");
                break;
            }

            tokio::select! {
                _ = interval.tick() => {
                    let time = self.clock.advance();
                    engine.tick(time);
                    ticks_run += 1;
                }
                _ = shutdown.recv() => {
                    info!("Scheduler received shutdown");
                    break;
                }
            }
        }

        info!("Scheduler stopped after {} ticks", ticks_run);
        ticks_run
    }
}
