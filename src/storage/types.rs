//! Core data types shared by the collector and the store.
//!
//! - [`FieldValue`]: Tagged scalar returned by the device
//! - [`RawResponse`]: Named values from one device call
//! - [`DataPoint`]: One time-series point destined for the store
//! - [`Batch`]: Points produced by one collection cycle

use std::collections::BTreeMap;
use std::fmt;

/// Measurement name used for every point.
pub const MEASUREMENT: &str = "fritz.box";

/// Tag key carrying the device service name.
pub const TAG_SECTION: &str = "section";

/// Tag key carrying the device action name.
pub const TAG_OPERATION: &str = "operation";

/// A scalar value reported by the device.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Whole number, written with the `i` suffix.
    Integer(i64),
    /// Decimal number.
    Float(f64),
    /// Anything else, written quoted.
    String(String),
}

impl FieldValue {
    /// Interpret a textual value from the device.
    ///
    /// Integers win; text containing a decimal point is tried as a float;
    /// anything else stays a string.
    ///
    /// ```
    /// use fritz_influx::FieldValue;
    ///
    /// assert_eq!(FieldValue::parse("12345"), FieldValue::Integer(12345));
    /// assert_eq!(FieldValue::parse("1.5"), FieldValue::Float(1.5));
    /// assert_eq!(FieldValue::parse("Up"), FieldValue::String("Up".into()));
    /// ```
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Self::Integer(i);
        }
        if trimmed.contains('.')
            && let Ok(f) = trimmed.parse::<f64>()
        {
            return Self::Float(f);
        }
        Self::String(text.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(v) => write!(f, "{}", v),
            Self::String(s) => write!(f, "{}", s),
        }
    }
}

/// Named values returned by one successful device call.
pub type RawResponse = BTreeMap<String, FieldValue>;

/// A single time-series point.
///
/// Carries no timestamp; the store stamps points on arrival.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    /// Measurement name (always [`MEASUREMENT`] for collected points).
    pub measurement: String,
    /// Identity tags (`section`, `operation`).
    pub tags: BTreeMap<String, String>,
    /// Extracted field values. May be empty.
    pub fields: BTreeMap<String, FieldValue>,
}

impl DataPoint {
    /// Create an empty point for a device section/operation pair.
    pub fn new(section: impl Into<String>, operation: impl Into<String>) -> Self {
        let mut tags = BTreeMap::new();
        tags.insert(TAG_SECTION.to_string(), section.into());
        tags.insert(TAG_OPERATION.to_string(), operation.into());
        Self {
            measurement: MEASUREMENT.to_string(),
            tags,
            fields: BTreeMap::new(),
        }
    }

    /// Add a field value.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Value of the `section` tag.
    pub fn section(&self) -> &str {
        self.tags.get(TAG_SECTION).map(String::as_str).unwrap_or("")
    }

    /// Value of the `operation` tag.
    pub fn operation(&self) -> &str {
        self.tags.get(TAG_OPERATION).map(String::as_str).unwrap_or("")
    }
}

/// Points from one collection cycle, in registry order.
pub type Batch = Vec<DataPoint>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_parse_integer() {
        assert_eq!(FieldValue::parse("0"), FieldValue::Integer(0));
        assert_eq!(FieldValue::parse("-42"), FieldValue::Integer(-42));
        assert_eq!(FieldValue::parse(" 7 "), FieldValue::Integer(7));
    }

    #[test]
    fn test_field_value_parse_float() {
        assert_eq!(FieldValue::parse("0.25"), FieldValue::Float(0.25));
    }

    #[test]
    fn test_field_value_parse_string() {
        assert_eq!(
            FieldValue::parse("Connected"),
            FieldValue::String("Connected".to_string())
        );
        // Counter beyond i64 range without a decimal point stays text
        assert_eq!(
            FieldValue::parse("18446744073709551615"),
            FieldValue::String("18446744073709551615".to_string())
        );
        assert_eq!(
            FieldValue::parse("192.168.178.1.2"),
            FieldValue::String("192.168.178.1.2".to_string())
        );
    }

    #[test]
    fn test_data_point_tags() {
        let point =
            DataPoint::new("WAN", "GetTotalBytesSent").with_field("NewTotalBytesSent", 1_i64);
        assert_eq!(point.measurement, MEASUREMENT);
        assert_eq!(point.section(), "WAN");
        assert_eq!(point.operation(), "GetTotalBytesSent");
        assert_eq!(
            point.fields.get("NewTotalBytesSent"),
            Some(&FieldValue::Integer(1))
        );
    }
}
