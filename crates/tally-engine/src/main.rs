//! Tally binary.
//!
//! Wires an in-memory expense store, the chart driver, and the chart
//! server together and runs until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `tally-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Create the in-memory expense store
//! 4. Create the server state and the driver command channel
//! 5. Spawn the chart driver
//! 6. Serve HTTP until a shutdown signal arrives
//! 7. Stop the driver and log why it ended

mod error;
mod frame_publisher;

use std::path::Path;
use std::sync::Arc;

use tally_core::config::{LogFormat, LoggingConfig, TallyConfig};
use tally_core::{ChartCommand, MemoryStore, run_chart};
use tally_server::{AppState, ServerConfig, start_server};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::frame_publisher::FramePublisher;

/// Capacity of the command channel from the server to the driver.
const COMMAND_CAPACITY: usize = 64;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the server cannot
/// bind, or the driver task fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = TallyConfig::load_or_default(Path::new("tally-config.yaml"))?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("tally-engine starting");
    info!(
        radius = config.chart.radius,
        inner_radius = config.chart.inner_radius,
        duration_ms = config.animation.duration_ms,
        easing = ?config.animation.easing,
        "Configuration loaded"
    );

    // 3. Create the expense store.
    let store = Arc::new(MemoryStore::new());

    // 4. Create server state and the driver command channel.
    let (commands, command_rx) = mpsc::channel(COMMAND_CAPACITY);
    let app_state = Arc::new(AppState::new(
        Arc::clone(&store),
        commands.clone(),
        config.chart.clone(),
    ));

    // 5. Spawn the chart driver.
    let driver = {
        let store = Arc::clone(&store);
        let state = Arc::clone(&app_state);
        let config = config.clone();
        tokio::spawn(async move {
            let mut publisher = FramePublisher::new(state);
            run_chart(store, &config, command_rx, &mut publisher).await
        })
    };
    info!("Chart driver spawned");

    // 6. Serve until Ctrl-C.
    let server_config = ServerConfig::from(&config.server);
    let served = start_server(&server_config, app_state, shutdown_signal()).await;

    // 7. Stop the driver.
    if commands.send(ChartCommand::Shutdown).await.is_err() {
        warn!("Chart driver already stopped");
    }
    store.close();
    let exit = driver.await.map_err(|e| EngineError::Driver {
        message: format!("{e}"),
    })?;
    served?;

    info!(?exit, "tally-engine shutdown complete");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Resolve when the process receives `Ctrl-C`.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
