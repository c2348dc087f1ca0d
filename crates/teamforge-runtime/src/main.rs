//! # TeamForge Runtime
//!
//! Headless host process for the Team Formation Engine.
//!
//! ## Startup sequence
//!
//! 1. Initialize logging (`RUST_LOG`, default `info`)
//! 2. Load configuration from the environment
//! 3. Validate matching and cadence parameters (fatal on rejection)
//! 4. Acquire the single-instance lock next to the state file
//! 5. Open the state store and wire service + scheduler
//! 6. Run the cadence loop until Ctrl-C, then shut down gracefully
//!
//! Delivery of team-formation messages is a collaborator concern; this host
//! wires the default logging notifier.

mod config;
mod lock;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use teamforge_engine::{
    FormationService, JsonFileStore, LogNotifier, MatchScheduler, SystemTimeSource,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::RuntimeConfig;
use crate::lock::InstanceLock;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("===========================================");
    info!("  TeamForge Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let config = RuntimeConfig::from_env()?;
    config.engine.validate().context("matching configuration")?;
    config.schedule.validate().context("cadence configuration")?;

    let data_dir = config
        .state_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let instance_lock = InstanceLock::acquire(data_dir)?;
    info!(
        "[runtime] instance lock acquired: {}",
        instance_lock.path().display()
    );

    let store = JsonFileStore::open(&config.state_path)?;
    let service = Arc::new(FormationService::new(
        store,
        config.engine,
        Arc::new(SystemTimeSource),
    )?);
    let scheduler = Arc::new(MatchScheduler::new(
        service,
        Arc::new(LogNotifier),
        config.schedule,
    )?);

    info!("[runtime] state file: {}", config.state_path.display());
    info!(
        "[runtime] team base {} (+{} elastic), rounds every {} day(s) at {:02}:00 UTC",
        config.engine.base,
        config.engine.elastic,
        config.schedule.interval_days,
        config.schedule.hour_utc
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let scheduler_task = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.run(shutdown_rx).await })
    };

    tokio::signal::ctrl_c()
        .await
        .context("listening for shutdown signal")?;
    info!("[runtime] shutdown signal received");

    // An in-flight round finishes before the loop exits.
    let _ = shutdown_tx.send(true);
    scheduler_task.await.context("scheduler task panicked")?;

    info!("[runtime] shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
