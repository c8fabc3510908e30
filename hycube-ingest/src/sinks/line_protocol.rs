use std::time::SystemTime;

use hycube_client::domain::{FieldValue, MeasurementPoint};
use time::OffsetDateTime;

use crate::pipeline::Envelope;

/// Escape a measurement name: commas and spaces.
fn escape_measurement(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            ',' | ' ' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
}

/// Escape tag keys, tag values and field keys: commas, spaces and equals.
fn escape_key(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            ',' | ' ' | '=' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
}

fn push_string_value(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
}

fn push_tag(out: &mut String, key: &str, value: &str) {
    out.push(',');
    escape_key(key, out);
    out.push('=');
    escape_key(value, out);
}

/// Returns false for values line protocol cannot carry (NaN, infinities).
fn push_field(out: &mut String, first: &mut bool, key: &str, value: &FieldValue) -> bool {
    if let FieldValue::Float(v) = value {
        if !v.is_finite() {
            return false;
        }
    }

    if *first {
        *first = false;
    } else {
        out.push(',');
    }

    escape_key(key, out);
    out.push('=');
    match value {
        FieldValue::Float(v) => out.push_str(&v.to_string()),
        FieldValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        FieldValue::Str(s) => push_string_value(s, out),
    }
    true
}

pub fn ts_to_unix_nanos(ts: SystemTime) -> i128 {
    OffsetDateTime::from(ts).unix_timestamp_nanos()
}

/// Append one line (without trailing newline). Returns false and leaves `out`
/// untouched when the point has no writable field.
pub fn write_point(point: &MeasurementPoint, ts_nanos: i128, out: &mut String) -> bool {
    let mark = out.len();

    escape_measurement(&point.series, out);
    for (k, v) in &point.tags {
        push_tag(out, k, v);
    }

    out.push(' ');
    let mut first = true;
    for (k, v) in &point.fields {
        if !push_field(out, &mut first, k, v) {
            tracing::debug!(series = %point.series, field = %k, "skipping non-finite field");
        }
    }

    if first {
        out.truncate(mark);
        return false;
    }

    out.push(' ');
    out.push_str(&ts_nanos.to_string());
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedBatch {
    pub body: String,
    pub lines: usize,
    pub skipped: usize,
}

/// Encode a batch, one line per point, all stamped with the batch receive time.
pub fn encode_batch(batch: &Envelope<Vec<MeasurementPoint>>) -> EncodedBatch {
    let ts = ts_to_unix_nanos(batch.received_at);
    // Heuristic capacity: ~96 bytes per line.
    let mut encoded = EncodedBatch {
        body: String::with_capacity(batch.payload.len().saturating_mul(96)),
        ..Default::default()
    };

    for point in &batch.payload {
        if write_point(point, ts, &mut encoded.body) {
            encoded.body.push('\n');
            encoded.lines += 1;
        } else {
            tracing::debug!(series = %point.series, tags = ?point.tags, "point has no fields, not written");
            encoded.skipped += 1;
        }
    }

    encoded
}
