// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! EcoTwin - Campus Digital Twin
//!
//! Runs the simulated campus: sensors tick on a fixed period, anomalies
//! and forecast breaches trigger automatic fixes, and savings accumulate.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use ecotwin::{Config, Engine, EngineEvent, Scheduler, SensorKind, SimClock, VERSION};

/// EcoTwin - Campus Digital Twin
#[derive(Parser, Debug)]
#[command(name = "ecotwin")]
#[command(author = "EcoTwin Project")]
#[command(version = VERSION)]
#[command(about = "Simulated campus sensors with anomaly detection and automated remediation")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Seed for the sensor noise streams
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many ticks
    #[arg(long)]
    ticks: Option<u64>,

    /// Tick period in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Print snapshot events as JSON lines
    #[arg(long)]
    json: bool,

    /// Force an anomaly at start-up, e.g. washroom_1:flow
    #[arg(long, value_parser = parse_target)]
    simulate: Vec<(String, SensorKind)>,
}

fn parse_target(s: &str) -> std::result::Result<(String, SensorKind), String> {
    let (location, kind) = s
        .split_once(':')
        .ok_or_else(|| format!("expected LOCATION:KIND, got '{}'", s))?;
    Ok((location.to_string(), kind.parse()?))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_ansi(!args.json)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("EcoTwin v{} - Campus Digital Twin", VERSION);

    // Load or create configuration
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;

    // Override with command line args
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(tick_ms) = args.tick_ms {
        config.engine.tick_interval_ms = tick_ms;
    }
    config.validate()?;

    info!("Configuration loaded from {:?}", config_path);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(config, args))
}

async fn run(config: Config, args: Args) -> Result<()> {
    let clock = SimClock::new(config.simulation.start_hour, config.simulation.seconds_per_tick);
    let period = Duration::from_millis(config.engine.tick_interval_ms);
    let mut engine = Engine::new(config)?;

    let consumer = tokio::spawn(consume_events(engine.subscribe(), args.json));

    for (location, kind) in &args.simulate {
        match engine.simulate_anomaly(location, *kind) {
            Ok(value) => info!("Simulating {} anomaly at {} ({:.1})", kind, location, value),
            Err(e) => warn!("Cannot simulate anomaly: {}", e),
        }
    }

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received, cleaning up...");
            let _ = ctrl_c_tx.send(());
        }
    });

    let mut scheduler = Scheduler::new(clock, period);
    if let Some(ticks) = args.ticks {
        scheduler = scheduler.with_max_ticks(ticks);
    }

    info!("EcoTwin running, press Ctrl+C to shutdown");
    scheduler.run(&mut engine, shutdown_rx).await;

    let metrics = engine.metrics();
    let stats = engine.detection_stats();
    info!(
        "Fixes completed: {}, water saved: {:.1} L, energy saved: {:.2} kWh, waste reduced: {:.1}%",
        metrics.totals.total_fixes,
        metrics.totals.water_saved_liters,
        metrics.totals.energy_saved_kwh,
        metrics.totals.waste_reduced_percent
    );
    info!(
        "CO2 avoided: {:.2} kg (~{:.2} trees/year); {} anomalies, {} fixes triggered",
        metrics.impact.total_co2_saved_kg,
        metrics.impact.trees_equivalent,
        stats.total_anomalies_detected,
        stats.fixes_triggered
    );

    drop(shutdown_tx);
    drop(engine);
    let _ = consumer.await;

    info!("EcoTwin shutdown complete");
    Ok(())
}

/// Log alerts and optionally print snapshots until the bus closes
async fn consume_events(mut rx: broadcast::Receiver<EngineEvent>, json: bool) {
    loop {
        match rx.recv().await {
            Ok(EngineEvent::AlertRaised(alert)) => {
                warn!(
                    "[{}] {} at {}: {} -> {}",
                    alert.urgency, alert.sensor_kind, alert.location_name, alert.reason, alert.action
                );
            }
            Ok(EngineEvent::FixCompleted(alert)) => {
                info!(
                    "{} at {}: {} (saved {:.2})",
                    alert.sensor_kind,
                    alert.location_name,
                    alert.action,
                    alert.saved_amount.unwrap_or(0.0)
                );
            }
            Ok(EngineEvent::Snapshot(snapshot)) => {
                if json {
                    match serde_json::to_string(snapshot.as_ref()) {
                        Ok(line) => println!("{}", line),
                        Err(e) => warn!("Failed to encode snapshot: {}", e),
                    }
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Event consumer lagging, skipped {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
