//! Canonical JSON rendering for deterministic comparisons.
//!
//! Object keys are sorted recursively, so two runs that produce the same data
//! render to byte-identical strings regardless of map ordering.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

/// Serialize `value` to pretty JSON with sorted object keys and a trailing newline.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("Failed to serialize value")?;
    let value = canonicalize_value(value);
    let mut s = serde_json::to_string_pretty(&value).context("Failed to format JSON")?;
    s.push('\n');
    Ok(s)
}

/// Fail with both renderings when two values differ canonically.
pub fn assert_same_json<A: Serialize, B: Serialize>(left: &A, right: &B) -> Result<()> {
    let left = canonical_json(left)?;
    let right = canonical_json(right)?;
    if left != right {
        anyhow::bail!("JSON mismatch\n--- left\n{left}--- right\n{right}");
    }
    Ok(())
}

fn canonicalize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut out = serde_json::Map::with_capacity(entries.len());
            for (k, v) in entries {
                out.insert(k, canonicalize_value(v));
            }
            Value::Object(out)
        }
        Value::Array(values) => Value::Array(values.into_iter().map(canonicalize_value).collect()),
        other => other,
    }
}
