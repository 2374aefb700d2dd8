mod name_helpers;
pub use name_helpers::*;

/// A JavaScript string literal holding `value`.
pub fn js_string(value: &str) -> String {
  serde_json::Value::String(value.to_string()).to_string()
}

/// Compact JSON text usable as a JavaScript expression.
pub fn js_value(value: &serde_json::Value) -> String {
  value.to_string()
}
