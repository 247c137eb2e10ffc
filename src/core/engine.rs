// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! Campus engine - the per-tick detection and remediation pipeline

use std::collections::HashMap;
use std::sync::Arc;
use anyhow::Result;
use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, trace, warn};

use super::{
    CampusSnapshot, DetectionStats, EngineEvent, EventBus, LocationInfo, LocationSnapshot,
    SensorSnapshot, SimTime,
};
use crate::analysis::{SensorInsights, StatisticalAnalyzer};
use crate::config::Config;
use crate::detection::{DetectionSignal, RemediationDecisionEngine, SignalAnalyzer};
use crate::error::{EngineError, EngineResult};
use crate::remediation::{Alert, AlertLog, MetricsAggregator, MetricsSnapshot, Transition};
use crate::sensors::{Campus, SensorId, SensorKind, SensorSimulator, SensorStatus};

/// Multiple of the threshold forced by `simulate_anomaly`
const SIMULATED_ANOMALY_FACTOR: f64 = 1.5;

/// Requests queued by handles, applied at the start of the next tick
#[derive(Debug, Clone)]
enum Command {
    ForceValue { sensor: SensorId, value: f64 },
}

/// Outcome of a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub anomalies_detected: usize,
    pub fixes_started: usize,
    pub fixes_completed: usize,
}

/// (location, kind) -> sensor lookup shared with handles
#[derive(Debug, Default)]
struct TargetIndex {
    sensors: HashMap<String, Vec<(SensorKind, SensorId, f64)>>,
}

impl TargetIndex {
    fn build(campus: &Campus) -> Self {
        let mut sensors = HashMap::new();
        for location in campus.locations() {
            let entries = location
                .sensors
                .iter()
                .map(|&id| {
                    let sensor = campus.sensor(id);
                    (sensor.kind(), id, sensor.threshold())
                })
                .collect();
            sensors.insert(location.id.clone(), entries);
        }
        Self { sensors }
    }

    fn resolve(&self, location: &str, kind: SensorKind) -> EngineResult<(SensorId, f64)> {
        let entries = self
            .sensors
            .get(location)
            .ok_or_else(|| EngineError::UnknownLocation(location.to_string()))?;
        entries
            .iter()
            .find(|(k, _, _)| *k == kind)
            .map(|&(_, id, threshold)| (id, threshold))
            .ok_or_else(|| EngineError::UnknownSensor {
                location: location.to_string(),
                kind,
            })
    }
}

/// State shared between the engine and its handles
#[derive(Clone)]
struct Shared {
    snapshot: Arc<RwLock<Arc<CampusSnapshot>>>,
    alerts: Arc<RwLock<AlertLog>>,
    targets: Arc<TargetIndex>,
    locations: Arc<Vec<LocationInfo>>,
    event_bus: Arc<EventBus>,
}

impl Shared {
    fn snapshot(&self) -> Arc<CampusSnapshot> {
        self.snapshot.read().clone()
    }

    fn alerts(&self, limit: usize) -> Vec<Alert> {
        self.alerts.read().recent(limit)
    }
}

/// Main EcoTwin engine. Owns every sensor and is the only writer of live
/// state; readers go through the published snapshot.
pub struct Engine {
    pub config: Arc<Config>,
    campus: Campus,
    simulator: SensorSimulator,
    analyzer: SignalAnalyzer,
    decisions: RemediationDecisionEngine,
    metrics: MetricsAggregator,
    stats: DetectionStats,
    last_time: SimTime,
    shared: Shared,
    command_tx: mpsc::UnboundedSender<Command>,
    command_rx: mpsc::UnboundedReceiver<Command>,
}

impl Engine {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let campus = Campus::new(&config.campus.locations, config.simulation.seed);
        let simulator = SensorSimulator::new(config.simulation.injection_rates());
        let event_bus = Arc::new(EventBus::new(config.engine.event_channel_capacity));
        let alerts = AlertLog::new(config.engine.alert_log_capacity);

        let locations = campus
            .locations()
            .iter()
            .map(|l| LocationInfo {
                id: l.id.clone(),
                name: l.name.clone(),
                category: l.category,
                sensors: l.sensors.iter().map(|&id| campus.sensor(id).kind()).collect(),
            })
            .collect();

        let shared = Shared {
            snapshot: Arc::new(RwLock::new(Arc::new(CampusSnapshot::default()))),
            alerts: Arc::new(RwLock::new(alerts)),
            targets: Arc::new(TargetIndex::build(&campus)),
            locations: Arc::new(locations),
            event_bus,
        };

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let start = SimTime::new(0, config.simulation.start_hour as u8, 0);
        let sensors_tracked = campus.sensors().len();

        let engine = Self {
            config: Arc::new(config),
            campus,
            simulator,
            analyzer: SignalAnalyzer::new(),
            decisions: RemediationDecisionEngine::new(),
            metrics: MetricsAggregator::new(),
            stats: DetectionStats {
                sensors_tracked,
                ..DetectionStats::default()
            },
            last_time: start,
            shared,
            command_tx,
            command_rx,
        };

        engine.publish_snapshot(false);

        info!(
            "EcoTwin engine ready: {} locations, {} sensors",
            engine.campus.locations().len(),
            engine.campus.sensors().len()
        );
        Ok(engine)
    }

    /// Cloneable reader/command handle
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            shared: self.shared.clone(),
            commands: self.command_tx.clone(),
        }
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        self.shared.event_bus.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.shared.event_bus.subscribe()
    }

    /// Run one tick over every sensor, then publish the snapshot
    pub fn tick(&mut self, time: SimTime) -> TickReport {
        self.drain_commands();

        let mut report = TickReport {
            tick: time.tick,
            ..TickReport::default()
        };

        let count = self.campus.sensors().len();
        for id in (0..count).map(SensorId) {
            self.process_sensor(id, time, &mut report);
        }

        self.last_time = time;
        self.publish_snapshot(true);

        trace!(
            "Tick {} (day {} {:02}:00): {} anomalies, {} fixes started, {} completed",
            time.tick, time.day, time.hour, report.anomalies_detected, report.fixes_started, report.fixes_completed
        );
        report
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.command_rx.try_recv() {
            match command {
                Command::ForceValue { sensor, value } => {
                    if let Err(e) = self.queue_forced_value(sensor, value) {
                        warn!("Dropping queued reading: {}", e);
                    }
                }
            }
        }
    }

    fn queue_forced_value(&mut self, id: SensorId, value: f64) -> EngineResult<()> {
        let location = self.campus.sensor(id).location;
        let sensor = self.campus.sensor_mut(id);
        if sensor.remediation.is_fixing() {
            let kind = sensor.kind();
            return Err(EngineError::FixInProgress {
                location: self.campus.location(location).id.clone(),
                kind,
            });
        }
        debug!("Forcing next {} reading to {:.2} ({:?})", sensor.kind(), value, id);
        sensor.forced_value = Some(value);
        Ok(())
    }

    fn process_sensor(&mut self, id: SensorId, time: SimTime, report: &mut TickReport) {
        let sensor = self.campus.sensor_mut(id);
        let fix = sensor.remediation.fix_override();

        // A forced reading waits until the sensor is evaluated again
        let forced = if sensor.remediation.accepts_decisions() {
            sensor.forced_value.take()
        } else {
            None
        };

        let value = match forced {
            Some(v) => sensor.profile.clamp(v),
            None => self
                .simulator
                .next_value(&sensor.profile, time, fix, sensor.value, &mut sensor.rng),
        };
        sensor.value = value;
        sensor.history.append(value);

        let transition = if sensor.remediation.accepts_decisions() {
            let window = sensor.history.snapshot();
            let (anomaly, forecast) = self.analyzer.analyze(&window);

            if anomaly.is_anomalous {
                self.stats.total_anomalies_detected += 1;
                report.anomalies_detected += 1;
            }
            if forecast.predicted_value.is_some() {
                self.stats.total_predictions_made += 1;
            }

            let signal = DetectionSignal::from_parts(&anomaly, &forecast);
            let decision = self.decisions.decide(value, sensor.threshold(), &signal);
            if decision.should_fix {
                let target = self.simulator.fix_target(&sensor.profile, value);
                sensor.remediation.apply(decision, target)
            } else {
                None
            }
        } else {
            sensor.remediation.advance()
        };

        let kind = sensor.kind();
        let location = sensor.location;

        match transition {
            Some(Transition::FixStarted { decision }) => {
                let loc = self.campus.location(location);
                info!(
                    "Auto-fix started at {} ({}): {} [{} urgency]",
                    loc.name, kind, decision.reason, decision.urgency
                );
                let alert = Alert::fixing(time.tick, &loc.id, &loc.name, kind, &decision);
                self.stats.fixes_triggered += 1;
                report.fixes_started += 1;
                self.record_alert(alert, EngineEvent::AlertRaised);
            }
            Some(Transition::FixCompleted { decision }) => {
                let loc = self.campus.location(location);
                self.metrics.record_fix(kind, decision.estimated_impact);
                info!(
                    "Auto-fix completed at {} ({}): saved {:.2}",
                    loc.name, kind, decision.estimated_impact.max(0.0)
                );
                let alert = Alert::completed(time.tick, &loc.id, &loc.name, kind, &decision);
                report.fixes_completed += 1;
                self.record_alert(alert, EngineEvent::FixCompleted);
            }
            Some(Transition::Released) => {
                debug!("{} sensor at {} back to normal", kind, self.campus.location(location).id);
            }
            None => {}
        }
    }

    fn record_alert(&self, alert: Alert, wrap: fn(Alert) -> EngineEvent) {
        self.shared.alerts.write().push(alert.clone());
        self.shared.event_bus.publish(wrap(alert));
    }

    fn build_snapshot(&self) -> CampusSnapshot {
        let locations = self
            .campus
            .locations()
            .iter()
            .map(|location| {
                let sensors: Vec<SensorSnapshot> = location
                    .sensors
                    .iter()
                    .map(|&id| {
                        let sensor = self.campus.sensor(id);
                        SensorSnapshot {
                            kind: sensor.kind(),
                            unit: sensor.profile.unit(),
                            value: sensor.value,
                            threshold: sensor.threshold(),
                            status: sensor.status(),
                            history: Arc::from(sensor.history.snapshot()),
                        }
                    })
                    .collect();
                let auto_fix_active = sensors.iter().any(|s| s.status == SensorStatus::AutoFixing);

                LocationSnapshot {
                    id: location.id.clone(),
                    name: location.name.clone(),
                    category: location.category,
                    sensors,
                    auto_fix_active,
                }
            })
            .collect();

        CampusSnapshot {
            tick: self.last_time.tick,
            timestamp: Utc::now(),
            hour: self.last_time.hour,
            day: self.last_time.day,
            locations,
            metrics: self.metrics.snapshot(),
            detection_stats: self.detection_stats(),
            total_locations: self.campus.locations().len(),
        }
    }

    fn publish_snapshot(&self, broadcast: bool) {
        let snapshot = Arc::new(self.build_snapshot());
        *self.shared.snapshot.write() = snapshot.clone();
        if broadcast {
            self.shared.event_bus.publish(EngineEvent::Snapshot(snapshot));
        }
    }

    /// Latest published state
    pub fn get_state_snapshot(&self) -> Arc<CampusSnapshot> {
        self.shared.snapshot()
    }

    /// Most recent alerts, newest first
    pub fn get_alerts(&self, limit: usize) -> Vec<Alert> {
        self.shared.alerts(limit)
    }

    /// Statistics over a sensor's live window
    pub fn get_insights(&self, location: &str, kind: SensorKind) -> EngineResult<SensorInsights> {
        let id = self.campus.resolve(location, kind)?;
        let window = self.campus.sensor(id).history.snapshot();
        Ok(StatisticalAnalyzer::new().insights(&window))
    }

    /// Force `1.5 x threshold` as the sensor's next reading. Returns the forced value.
    pub fn simulate_anomaly(&mut self, location: &str, kind: SensorKind) -> EngineResult<f64> {
        let id = self.campus.resolve(location, kind)?;
        let value = self.campus.sensor(id).threshold() * SIMULATED_ANOMALY_FACTOR;
        self.queue_forced_value(id, value)?;
        info!("Simulated anomaly queued for {} at {}: {:.2}", kind, location, value);
        Ok(value)
    }

    /// Replace the sensor's next generated reading
    pub fn force_next_value(&mut self, location: &str, kind: SensorKind, value: f64) -> EngineResult<()> {
        let id = self.campus.resolve(location, kind)?;
        self.queue_forced_value(id, value)
    }

    /// Seed a sensor's window with past readings, oldest first
    pub fn prime_history(&mut self, location: &str, kind: SensorKind, values: &[f64]) -> EngineResult<()> {
        let id = self.campus.resolve(location, kind)?;
        let sensor = self.campus.sensor_mut(id);
        for &v in values {
            let v = sensor.profile.clamp(v);
            sensor.history.append(v);
            sensor.value = v;
        }
        debug!("Primed {} readings for {} at {}", values.len(), kind, location);
        self.publish_snapshot(false);
        Ok(())
    }

    pub fn locations(&self) -> Vec<LocationInfo> {
        self.shared.locations.as_ref().clone()
    }

    pub fn detection_stats(&self) -> DetectionStats {
        DetectionStats {
            total_data_points: self.campus.sensors().iter().map(|s| s.history.size()).sum(),
            ..self.stats
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn sensor_status(&self, location: &str, kind: SensorKind) -> EngineResult<SensorStatus> {
        let id = self.campus.resolve(location, kind)?;
        Ok(self.campus.sensor(id).status())
    }
}

/// Cloneable view of a running engine. Reads come from the latest
/// snapshot; writes are queued for the next tick.
#[derive(Clone)]
pub struct EngineHandle {
    shared: Shared,
    commands: mpsc::UnboundedSender<Command>,
}

impl EngineHandle {
    pub fn get_state_snapshot(&self) -> Arc<CampusSnapshot> {
        self.shared.snapshot()
    }

    pub fn get_alerts(&self, limit: usize) -> Vec<Alert> {
        self.shared.alerts(limit)
    }

    pub fn get_insights(&self, location: &str, kind: SensorKind) -> EngineResult<SensorInsights> {
        self.shared.targets.resolve(location, kind)?;
        let snapshot = self.shared.snapshot();
        let window = snapshot
            .sensor(location, kind)
            .map(|s| s.history.clone())
            .unwrap_or_else(|| Arc::from(Vec::new()));
        Ok(StatisticalAnalyzer::new().insights(&window))
    }

    pub fn simulate_anomaly(&self, location: &str, kind: SensorKind) -> EngineResult<f64> {
        let (_, threshold) = self.shared.targets.resolve(location, kind)?;
        let value = threshold * SIMULATED_ANOMALY_FACTOR;
        self.force_next_value(location, kind, value)?;
        Ok(value)
    }

    pub fn force_next_value(&self, location: &str, kind: SensorKind, value: f64) -> EngineResult<()> {
        let (sensor, _) = self.shared.targets.resolve(location, kind)?;

        let fixing = self
            .shared
            .snapshot()
            .sensor(location, kind)
            .map(|s| s.status == SensorStatus::AutoFixing)
            .unwrap_or(false);
        if fixing {
            warn!("Rejected forced reading for {} at {}: fix in progress", kind, location);
            return Err(EngineError::FixInProgress {
                location: location.to_string(),
                kind,
            });
        }

        self.commands
            .send(Command::ForceValue { sensor, value })
            .map_err(|_| EngineError::EngineStopped)
    }

    pub fn locations(&self) -> Vec<LocationInfo> {
        self.shared.locations.as_ref().clone()
    }

    pub fn detection_stats(&self) -> DetectionStats {
        self.shared.snapshot().detection_stats
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.shared.event_bus.subscribe()
    }
}
