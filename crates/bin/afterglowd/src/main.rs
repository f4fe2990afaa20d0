//! # afterglowd — afterglow daemon
//!
//! Composition root that wires the adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (TOML file, env vars)
//! - Initialize tracing
//! - Construct the device platform (virtual adapter)
//! - Construct the scheduler, event bus, and directory service
//! - Build the axum router and serve it
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use afterglow_adapter_http_axum::state::AppState;
use afterglow_adapter_virtual::VirtualActuator;
use afterglow_app::countdown::TokioCountdown;
use afterglow_app::event_bus::InProcessTimerBus;
use afterglow_app::scheduler::DeviceTimerScheduler;
use afterglow_app::services::DirectoryService;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Device platform
    let platform = if config.platform.demo_devices {
        Arc::new(
            VirtualActuator::with_demo_devices()
                .await
                .context("building demo devices")?,
        )
    } else {
        Arc::new(VirtualActuator::new())
    };

    // Event bus
    let event_bus = Arc::new(InProcessTimerBus::new(256));

    // Scheduler & directory
    let scheduler = DeviceTimerScheduler::new(
        Arc::clone(&platform),
        Arc::clone(&event_bus),
        TokioCountdown::new(),
    );
    let directory = Arc::new(DirectoryService::new(Arc::clone(&platform)));

    // HTTP
    let state = AppState::new(scheduler, directory, event_bus);
    let app = afterglow_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(%bind_addr, "afterglowd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    tracing::info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
    }
}
