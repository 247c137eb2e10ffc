// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Event bus for outbound engine events

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use serde::Serialize;

use super::CampusSnapshot;
use crate::remediation::Alert;

/// Events pushed to subscribers
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Full state after a tick
    Snapshot(Arc<CampusSnapshot>),
    /// A fix has started
    AlertRaised(Alert),
    /// A fix has finished and was credited
    FixCompleted(Alert),
}

impl EngineEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            EngineEvent::Snapshot(_) => "snapshot",
            EngineEvent::AlertRaised(_) => "alert_raised",
            EngineEvent::FixCompleted(_) => "fix_completed",
        }
    }
}

/// Fire-and-forget broadcast of engine events. Publishing never blocks;
/// a subscriber that falls behind skips the oldest events.
#[derive(Debug)]
pub struct EventBus {
    event_tx: broadcast::Sender<EngineEvent>,
    event_counter: AtomicU64,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity.max(1));

        Self {
            event_tx,
            event_counter: AtomicU64::new(0),
        }
    }

    pub fn publish(&self, event: EngineEvent) {
        self.event_counter.fetch_add(1, Ordering::Relaxed);
        // No subscribers is not an error
        let _ = self.event_tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.event_tx.receiver_count()
    }

    /// Events published since creation
    pub fn published(&self) -> u64 {
        self.event_counter.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new(4);
        bus.publish(EngineEvent::Snapshot(Arc::new(CampusSnapshot::default())));
        assert_eq!(bus.published(), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_slow_subscriber_lags() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for _ in 0..5 {
            bus.publish(EngineEvent::Snapshot(Arc::new(CampusSnapshot::default())));
        }
        assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Lagged(3))));
        assert!(rx.try_recv().is_ok());
    }
}
