//! # lightkeeperd — lightkeeper daemon
//!
//! Composition root that wires the adapters together and runs the
//! reconciliation loop.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize `tracing` with the configured filter
//! - Open the JSON snapshot store and the virtual dispatcher
//! - Register the configured seed devices
//! - Run a reconciliation pass every tick until Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use lightkeeper_adapter_storage_json::JsonStore;
use lightkeeper_adapter_virtual::VirtualDispatcher;
use lightkeeper_app::controller::LightController;
use lightkeeper_app::ports::{CommandDispatcher, DeviceRepository, HistoryLog, ScheduleRepository};
use lightkeeper_domain::error::LightkeeperError;
use lightkeeper_domain::id::DeviceId;
use lightkeeper_domain::time;

use crate::config::{Config, DeviceSeed};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Storage
    let store = Arc::new(JsonStore::open(config.storage.path.clone()).await?);
    tracing::info!(path = %config.storage.path.display(), "snapshot store opened");

    // Dispatcher
    let dispatcher = Arc::new(VirtualDispatcher::new());

    // Controller
    let controller = LightController::new(store.clone(), store.clone(), store, dispatcher);
    seed_devices(&controller, &config.devices).await?;

    let mut ticker = tokio::time::interval(config.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!(
        tick_secs = config.engine.tick_interval_secs,
        "lightkeeperd running"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match controller.tick(time::now()).await {
                    Ok(report) => tracing::debug!(
                        active = report.active_events.len(),
                        switched = report.switched.len(),
                        dispatched = report.dispatched.len(),
                        failures = report.dispatch_failures.len(),
                        "tick complete"
                    ),
                    Err(err) => tracing::error!(error = %err, "tick failed"),
                }
            }
            result = tokio::signal::ctrl_c() => {
                if let Err(err) = result {
                    tracing::error!(error = %err, "failed to listen for shutdown signal");
                }
                tracing::info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Register every configured device not yet present in storage.
async fn seed_devices<D, S, H, C>(
    controller: &LightController<D, S, H, C>,
    seeds: &[DeviceSeed],
) -> Result<(), LightkeeperError>
where
    D: DeviceRepository + Clone,
    S: ScheduleRepository + Clone,
    H: HistoryLog + Clone,
    C: CommandDispatcher + Clone,
{
    for seed in seeds {
        let id = DeviceId::new(seed.id.as_str())?;
        match controller
            .add_device(id, seed.name.as_str(), seed.location.as_str(), time::now())
            .await
        {
            Ok(applied) => tracing::info!(device_id = %applied.value.id, "seed device registered"),
            Err(LightkeeperError::Duplicate(_)) => {
                tracing::debug!(device_id = %seed.id, "seed device already registered");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}
