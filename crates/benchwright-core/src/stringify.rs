use serde_json::Value;

/// Render a float the way every adapter and aggregation does.
///
/// Rust's shortest-round-trip `Display` keeps whole results integral
/// (`30.0` renders as `30`) so golden answers stay free of spurious
/// fractional suffixes.
pub fn format_f64(value: f64) -> String {
    format!("{value}")
}

/// Render a navigated JSON/YAML value as answer text.
///
/// Scalars render bare (strings unquoted, booleans lowercase, `null` as the
/// literal word); arrays and objects render as compact JSON.
pub fn stringify_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(value) => value.to_string(),
        Value::Number(value) => value.to_string(),
        Value::String(value) => value.clone(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
        }
    }
}
