//! fritz-influx - FRITZ!Box to InfluxDB bridge
//!
//! Polls a FRITZ!Box router over TR-064 at a fixed period and writes the
//! selected counters to an InfluxDB v1 database. It can be used as a library
//! or run as the standalone `fritz-influx` binary.
//!
//! # Architecture
//!
//! - **Collector**: Metric registry, per-cycle collection and the TR-064 client
//! - **Storage**: Data points, line protocol and the InfluxDB client
//! - **Scheduler**: Phase-locked collect-then-publish loop
//! - **Config**: YAML file with environment overrides
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fritz_influx::{AppConfig, InfluxClient, Scheduler, Tr064Client};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load("fritz-influx.yaml")?;
//! let device = Tr064Client::connect(&config.device).await?;
//! let store = InfluxClient::connect(&config.store).await?;
//!
//! let scheduler = Scheduler::new(
//!     config.schedule.period,
//!     config.metric_specs(),
//!     Arc::new(device),
//!     Arc::new(store),
//! );
//! scheduler.run().await;
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod scheduler;
pub mod storage;

pub use collector::tr064::{Tr064Client, Tr064Config};
pub use collector::{DeviceClient, DeviceError, MetricSpec, collect, default_registry};
pub use config::{AppConfig, ConfigError};
pub use scheduler::Scheduler;
pub use storage::{
    Batch, DataPoint, FieldValue, InfluxClient, InfluxConfig, PublishOutcome, StoreClient,
    StoreError, publish,
};
