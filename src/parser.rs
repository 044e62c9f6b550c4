//! JSON decoder for `waste_logs` snapshots served by the realtime database.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tracing::debug;

use crate::event::{Snapshot, WasteEvent};

/// Decodes a snapshot payload.
///
/// The payload is either `null` (nothing stored yet), an object keyed by
/// event id, or an array (the database returns integer-keyed children this
/// way, with `null` holes for missing indices). Malformed records are
/// tolerated: a bad timestamp becomes `None` and a missing category becomes an
/// empty label. Records that are not objects are skipped.
///
/// # Errors
///
/// Returns an error if the bytes are not JSON, or if the top level is a
/// scalar other than `null`.
pub fn parse_snapshot(bytes: &[u8]) -> Result<Snapshot> {
    let root: Value = serde_json::from_slice(bytes).context("snapshot is not valid JSON")?;

    let records: Vec<(String, Value)> = match root {
        Value::Null => Vec::new(),
        Value::Object(map) => map.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        other => bail!("unexpected snapshot root: {}", kind_of(&other)),
    };

    let events: Vec<WasteEvent> = records
        .into_iter()
        .filter_map(|(id, record)| parse_record(id, &record))
        .collect();

    debug!(events = events.len(), "Snapshot parsed");
    Ok(Snapshot::new(events))
}

fn parse_record(id: String, record: &Value) -> Option<WasteEvent> {
    let Value::Object(fields) = record else {
        debug!(id = %id, kind = kind_of(record), "Skipping non-object record");
        return None;
    };

    let category = fields
        .get("type")
        .or_else(|| fields.get("category"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let timestamp = fields.get("timestamp").and_then(parse_timestamp);
    if timestamp.is_none() {
        debug!(id = %id, "Record has no usable timestamp");
    }

    Some(WasteEvent {
        id,
        category,
        timestamp,
    })
}

/// Accepts integer seconds as a numeric string or a JSON integer.
fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
