//! Collector Layer
//!
//! Polls the device for every registered [`MetricSpec`] and turns the
//! answers into a [`Batch`](crate::storage::Batch).
//!
//! # Architecture
//!
//! - [`DeviceClient`]: Trait for devices exposing named operations
//! - [`MetricSpec`]: One operation plus the response fields to keep
//! - [`collect`]: One pass over the registry with per-spec fault isolation
//! - [`tr064`]: FRITZ!Box TR-064 implementation of [`DeviceClient`]
//!
//! # Example
//!
//! ```rust,no_run
//! use fritz_influx::collector::{collect, default_registry, tr064::{Tr064Client, Tr064Config}};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let device = Tr064Client::connect(&Tr064Config::default()).await?;
//! let batch = collect(&default_registry(), &device).await;
//! println!("collected {} points", batch.len());
//! # Ok(())
//! # }
//! ```

mod collect;
mod registry;
mod traits;
pub mod tr064;

pub use collect::{collect, to_data_point};
pub use registry::{MetricSpec, default_registry};
pub use traits::{DeviceClient, DeviceError};
