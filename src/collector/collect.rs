//! One collection pass over the registry.

use crate::collector::registry::MetricSpec;
use crate::collector::traits::DeviceClient;
use crate::storage::{Batch, DataPoint, RawResponse};

/// Run every spec against the device and build the batch.
///
/// Specs are called one after another in registry order. A failing call is
/// logged and contributes no point; the remaining specs still run. Never
/// fails: the result may be shorter than `specs`, or empty.
pub async fn collect(specs: &[MetricSpec], device: &dyn DeviceClient) -> Batch {
    let mut batch = Vec::with_capacity(specs.len());
    let mut failed = 0usize;

    for spec in specs {
        match device.call(&spec.section, &spec.operation).await {
            Ok(response) => {
                let point = to_data_point(spec, response);
                tracing::debug!(
                    section = %spec.section,
                    operation = %spec.operation,
                    fields = point.fields.len(),
                    "Device call succeeded"
                );
                batch.push(point);
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(
                    section = %spec.section,
                    operation = %spec.operation,
                    error = %e,
                    "Device call failed, skipping"
                );
            }
        }
    }

    tracing::debug!(points = batch.len(), failed, "Collection pass finished");
    batch
}

/// Build a point from a spec and its response.
///
/// Only requested fields present in the response are kept; missing ones are
/// omitted rather than defaulted, so the point may end up with no fields.
pub fn to_data_point(spec: &MetricSpec, mut response: RawResponse) -> DataPoint {
    let mut point = DataPoint::new(spec.section.as_str(), spec.operation.as_str());
    for field in &spec.fields {
        if let Some((name, value)) = response.remove_entry(field) {
            point.fields.insert(name, value);
        }
    }
    point
}
