//! InfluxDB line protocol encoding.
//!
//! `measurement,tag=value field=value` with no timestamp, so the server
//! stamps each point on arrival.

use crate::storage::types::{DataPoint, FieldValue};

/// Encode one point as a line.
///
/// Returns `None` when the point has no encodable field, since line protocol
/// requires at least one.
pub fn encode_point(point: &DataPoint) -> Option<String> {
    let mut fields = String::new();
    for (key, value) in &point.fields {
        let Some(encoded) = encode_field_value(value) else {
            continue;
        };
        if !fields.is_empty() {
            fields.push(',');
        }
        escape_key(&mut fields, key);
        fields.push('=');
        fields.push_str(&encoded);
    }
    if fields.is_empty() {
        return None;
    }

    let mut line = String::new();
    escape_measurement(&mut line, &point.measurement);
    for (key, value) in &point.tags {
        // Empty tag values are invalid in line protocol
        if value.is_empty() {
            continue;
        }
        line.push(',');
        escape_key(&mut line, key);
        line.push('=');
        escape_key(&mut line, value);
    }
    line.push(' ');
    line.push_str(&fields);
    Some(line)
}

/// Encode a batch as a newline-separated body.
///
/// Points without fields are skipped; the returned count is the number of
/// lines actually written.
pub fn encode_batch(points: &[DataPoint]) -> (String, usize) {
    let mut body = String::new();
    let mut lines = 0;
    for point in points {
        match encode_point(point) {
            Some(line) => {
                body.push_str(&line);
                body.push('\n');
                lines += 1;
            }
            None => {
                tracing::debug!(
                    section = point.section(),
                    operation = point.operation(),
                    "Skipping point without fields"
                );
            }
        }
    }
    (body, lines)
}

fn encode_field_value(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Integer(i) => Some(format!("{}i", i)),
        FieldValue::Float(f) if f.is_finite() => Some(f.to_string()),
        FieldValue::Float(_) => None,
        FieldValue::String(s) => {
            let mut out = String::with_capacity(s.len() + 2);
            out.push('"');
            for c in s.chars() {
                if c == '"' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
            Some(out)
        }
    }
}

fn escape_measurement(out: &mut String, s: &str) {
    for c in s.chars() {
        if c == ',' || c == ' ' {
            out.push('\\');
        }
        out.push(c);
    }
}

fn escape_key(out: &mut String, s: &str) {
    for c in s.chars() {
        if c == ',' || c == ' ' || c == '=' {
            out.push('\\');
        }
        out.push(c);
    }
}
