//! JSON ingestion implementation.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"city":"X","date":"2021-01","index":50}, ...]`
//! - A single JSON object (one row)
//! - Newline-delimited JSON (NDJSON): one object per line
//!
//! The header is the union of object keys in first-seen order.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{LoadError, LoadResult};
use crate::types::{CellValue, RawRow, RawTable};

/// Read a JSON/NDJSON file into a [`RawTable`].
pub fn read_json_from_path(path: impl AsRef<Path>) -> LoadResult<RawTable> {
    let text = fs::read_to_string(path)?;
    read_json_from_str(&text)
}

/// Read JSON from an in-memory string into a [`RawTable`].
pub fn read_json_from_str(input: &str) -> LoadResult<RawTable> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(LoadError::format("json input is empty"));
    }

    // First try parsing as a single JSON value (array or object).
    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        match v {
            Value::Array(items) => table_from_values(&items),
            Value::Object(_) => table_from_values(std::slice::from_ref(&v)),
            _ => Err(LoadError::format(
                "json must be an object, an array of objects, or NDJSON",
            )),
        }
    } else {
        // Fall back to NDJSON.
        let mut values = Vec::new();
        for (i, line) in trimmed.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let v = serde_json::from_str::<Value>(line)
                .map_err(|e| LoadError::format(format!("invalid ndjson at line {}: {}", i + 1, e)))?;
            values.push(v);
        }
        table_from_values(&values)
    }
}

fn table_from_values(values: &[Value]) -> LoadResult<RawTable> {
    let mut header: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(values.len());

    for (idx0, v) in values.iter().enumerate() {
        let obj = v
            .as_object()
            .ok_or_else(|| LoadError::format(format!("row {} is not a json object", idx0 + 1)))?;
        extend_header(&mut header, obj);
        rows.push(RawRow::from_pairs(
            obj.iter().map(|(k, jv)| (k.clone(), convert_json_value(jv))),
        ));
    }

    if header.is_empty() {
        return Err(LoadError::format("json input has no fields"));
    }
    Ok(RawTable::new(header, rows))
}

fn extend_header(header: &mut Vec<String>, obj: &Map<String, Value>) {
    for key in obj.keys() {
        if !header.iter().any(|h| h == key) {
            header.push(key.clone());
        }
    }
}

fn convert_json_value(v: &Value) -> CellValue {
    match v {
        Value::Null => CellValue::Empty,
        Value::String(s) => CellValue::from_text(s.as_str()),
        Value::Number(n) => n.as_f64().map_or(CellValue::Empty, CellValue::Number),
        other => CellValue::Text(other.to_string()),
    }
}
