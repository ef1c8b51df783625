//! Spotpulse Monitor
//!
//! Polls spot prices for the most traded pairs, raises alerts on sharp
//! moves and sends a periodic tally of bullish/bearish signals.

use dotenvy::dotenv;
use spotpulse::config::MonitorConfig;
use spotpulse::core::MonitorRuntime;
use spotpulse::logging;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    let config = MonitorConfig::from_env();
    logging::init_logging(config.as_ref().ok().and_then(|c| c.log_file.as_deref()));

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Cannot start without required configuration");
            return Err(e.into());
        }
    };

    let env = spotpulse::config::get_environment();
    info!("Starting Spotpulse Monitor");
    info!(environment = %env, "Environment");
    config.log_summary();

    let runtime = MonitorRuntime::from_config(&config).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received, finishing current step...");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    runtime.run(shutdown_rx).await?;
    info!("Monitor stopped");
    Ok(())
}
