#![allow(dead_code)]

// tests/common/mod.rs
use serde_json::Value;

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// Sorted top-level keys of a JSON object.
pub fn object_keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<String> = value
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default();
    keys.sort();
    keys
}

/// True if the JSON text contains `needle` anywhere, keys or values.
pub fn mentions(value: &Value, needle: &str) -> bool {
    value.to_string().contains(needle)
}
