//! Metric spec registry.
//!
//! A [`MetricSpec`] names one device operation and the response fields worth
//! keeping. The registry is a fixed ordered list built once at startup.

use serde::{Deserialize, Serialize};

/// One device operation and the response fields to extract from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSpec {
    /// Device service name (e.g. "WANCommonIFC1").
    pub section: String,
    /// Action to invoke (e.g. "GetTotalBytesSent").
    pub operation: String,
    /// Response fields to keep, in order.
    pub fields: Vec<String>,
}

impl MetricSpec {
    /// Create a new metric spec.
    pub fn new<I, S>(section: impl Into<String>, operation: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            section: section.into(),
            operation: operation.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl std::fmt::Display for MetricSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.section, self.operation)
    }
}

const WLAN_STATISTICS: [&str; 2] = ["NewTotalPacketsSent", "NewTotalPacketsReceived"];

/// The default registry: WAN traffic, uptime, WLAN packet counters and DSL
/// line rates.
pub fn default_registry() -> Vec<MetricSpec> {
    vec![
        MetricSpec::new("WANCommonIFC1", "GetTotalBytesSent", ["NewTotalBytesSent"]),
        MetricSpec::new(
            "WANCommonIFC1",
            "GetTotalBytesReceived",
            ["NewTotalBytesReceived"],
        ),
        MetricSpec::new("WANIPConn1", "GetStatusInfo", ["NewUptime"]),
        MetricSpec::new("WLANConfiguration1", "GetStatistics", WLAN_STATISTICS),
        MetricSpec::new("WLANConfiguration2", "GetStatistics", WLAN_STATISTICS),
        MetricSpec::new("WLANConfiguration3", "GetStatistics", WLAN_STATISTICS),
        MetricSpec::new(
            "WANDSLInterfaceConfig1",
            "GetInfo",
            [
                "NewUpstreamCurrRate",
                "NewDownstreamCurrRate",
                "NewUpstreamMaxRate",
                "NewDownstreamMaxRate",
            ],
        ),
    ]
}
