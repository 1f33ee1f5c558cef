//! fritz-influx Binary Entry Point
//!
//! Connects to the router and the database, then runs collection cycles
//! until Ctrl+C or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use fritz_influx::{
    AppConfig, InfluxClient, Scheduler, Tr064Client, config::parse_duration,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// fritz-influx - FRITZ!Box to InfluxDB bridge
#[derive(Parser, Debug)]
#[command(name = "fritz-influx", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (defaults are used when absent)
    #[arg(short, long, env = "FRITZ_INFLUX_CONFIG")]
    config: Option<String>,

    /// Router address (overrides config file)
    #[arg(long, env = "FRITZBOX_ADDRESS")]
    fritzbox_address: Option<String>,

    /// Router user (overrides config file)
    #[arg(long, env = "FRITZBOX_USERNAME")]
    fritzbox_username: Option<String>,

    /// Router password (overrides config file)
    #[arg(long, env = "FRITZBOX_PASSWORD", hide_env_values = true)]
    fritzbox_password: Option<String>,

    /// InfluxDB host (overrides config file)
    #[arg(long, env = "INFLUXDB_ADDRESS")]
    influxdb_address: Option<String>,

    /// InfluxDB user (overrides config file)
    #[arg(long, env = "INFLUXDB_USERNAME")]
    influxdb_username: Option<String>,

    /// InfluxDB password (overrides config file)
    #[arg(long, env = "INFLUXDB_PASSWORD", hide_env_values = true)]
    influxdb_password: Option<String>,

    /// InfluxDB database (overrides config file)
    #[arg(long, env = "INFLUXDB_DATABASE")]
    influxdb_database: Option<String>,

    /// Collection period, in seconds or as "30s", "1m" (overrides config file)
    #[arg(long, env = "FETCH_EVERY", value_parser = parse_duration)]
    fetch_every: Option<Duration>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fritz_influx=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("fritz-influx - FRITZ!Box to InfluxDB bridge");

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => {
            tracing::info!("Loading configuration from: {}", path);
            AppConfig::load(path)?
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            AppConfig::default()
        }
    };

    // Apply CLI/env overrides (CLI > ENV > config file)
    if let Some(address) = cli.fritzbox_address {
        config.device.address = address;
    }
    if let Some(username) = cli.fritzbox_username {
        config.device.username = Some(username);
    }
    if let Some(password) = cli.fritzbox_password {
        config.device.password = Some(password);
    }
    if let Some(host) = cli.influxdb_address {
        config.store.host = host;
    }
    if let Some(username) = cli.influxdb_username {
        config.store.username = username;
    }
    if let Some(password) = cli.influxdb_password {
        config.store.password = password;
    }
    if let Some(database) = cli.influxdb_database {
        config.store.database = database;
    }
    if let Some(period) = cli.fetch_every {
        config.schedule.period = period;
    }
    config.validate()?;

    tracing::info!(
        "Device: {}, Store: {} (database {}), Period: {:?}",
        config.device.base_url(),
        config.store.base_url(),
        config.store.database,
        config.schedule.period,
    );

    let specs = config.metric_specs();

    let device = Tr064Client::connect(&config.device).await?;
    for spec in &specs {
        if !device.has_service(&spec.section) {
            tracing::warn!(metric = %spec, "Device does not offer this service; it will be skipped");
        }
    }

    let store = InfluxClient::connect(&config.store).await?;

    let scheduler = Scheduler::new(
        config.schedule.period,
        specs,
        Arc::new(device),
        Arc::new(store),
    );

    tracing::info!("Press Ctrl+C to shutdown");
    scheduler.run_until(shutdown_signal()).await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}
