//! Sentinel filtering for "value unknown" placeholders

use serde_json::Value;

/// Placeholder strings the upstream uses when a value is unknown
pub const SENTINELS: &[&str] = &["unknown", "n/a"];

/// Check whether a string is a sentinel placeholder (case-insensitive)
pub fn is_sentinel(s: &str) -> bool {
    SENTINELS.iter().any(|sentinel| s.eq_ignore_ascii_case(sentinel))
}

/// Map sentinel placeholders and JSON null to an absent value.
pub fn normalize(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(ref s) if is_sentinel(s) => None,
        other => Some(other),
    }
}
