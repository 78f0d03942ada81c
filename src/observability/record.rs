//! Flat JSON rendering of finished spans.
//!
//! Each span becomes one self-contained object, written as one line:
//!
//! ```json
//! {"timestamp":"2024-05-01T02:03:04.000120Z","service":"zentao-desk",
//!  "trace_id":"4bf92f3577b34da6a3ce929d0e0e4736","span_id":"00f067aa0ba902b7",
//!  "parent_span_id":null,"name":"bridge_call","duration_us":812,
//!  "status":"unset","attributes":{"command":"get_products"}}
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use opentelemetry::trace::{SpanId, Status};
use opentelemetry_sdk::export::trace::SpanData;
use serde_json::{json, Map, Value as JsonValue};

/// Renders one span.
#[must_use]
pub fn span_record(service: &str, span: &SpanData) -> JsonValue {
    let started: DateTime<Utc> = span.start_time.into();
    let duration_us = span
        .end_time
        .duration_since(span.start_time)
        .map_or(0, |d| u64::try_from(d.as_micros()).unwrap_or(u64::MAX));

    let parent = (span.parent_span_id != SpanId::INVALID).then(|| format!("{:016x}", span.parent_span_id));

    let mut record = json!({
        "timestamp": started.to_rfc3339_opts(SecondsFormat::Micros, true),
        "service": service,
        "trace_id": format!("{:032x}", span.span_context.trace_id()),
        "span_id": format!("{:016x}", span.span_context.span_id()),
        "parent_span_id": parent,
        "name": span.name,
        "duration_us": duration_us,
        "status": status_name(&span.status),
        "attributes": attributes(&span.attributes),
    });

    if let Status::Error { description } = &span.status {
        record["status_message"] = JsonValue::String(description.to_string());
    }
    record
}

const fn status_name(status: &Status) -> &'static str {
    match status {
        Status::Unset => "unset",
        Status::Ok => "ok",
        Status::Error { .. } => "error",
    }
}

fn attributes(attributes: &[opentelemetry::KeyValue]) -> JsonValue {
    let map: Map<String, JsonValue> = attributes
        .iter()
        .map(|kv| (kv.key.to_string(), attribute_value(&kv.value)))
        .collect();
    JsonValue::Object(map)
}

fn attribute_value(value: &opentelemetry::Value) -> JsonValue {
    use opentelemetry::Value;

    match value {
        Value::Bool(b) => json!(b),
        Value::I64(i) => json!(i),
        Value::F64(f) => json!(f),
        Value::String(s) => json!(s.as_str()),
        other => json!(other.to_string()),
    }
}
