//! Storage Layer
//!
//! Everything on the way from a collected batch to the time-series store:
//!
//! - [`DataPoint`] / [`Batch`]: Points produced by the collector
//! - [`StoreClient`]: Trait for stores accepting one batch per write
//! - [`publish`]: Single-write publish step with outcome logging
//! - [`InfluxClient`]: InfluxDB v1 line protocol implementation

mod error;
pub mod influx;
pub mod line_protocol;
mod publisher;
mod types;

pub use error::StoreError;
pub use influx::{InfluxClient, InfluxConfig};
pub use publisher::{PublishOutcome, PublishResult, StoreClient, publish};
pub use types::{
    Batch, DataPoint, FieldValue, MEASUREMENT, RawResponse, TAG_OPERATION, TAG_SECTION,
};
