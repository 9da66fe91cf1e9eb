use serde_json::Value;

/// Reads the `error` member of a JSON object the way the builder and the
/// backend both signal failure. Falsy values (`null`, `false`, `""`, `0`)
/// count as absent; strings are returned verbatim, anything else in its
/// JSON text form.
pub fn error_field(value: &Value) -> Option<String> {
    match value.as_object()?.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(message) if message.is_empty() => None,
        Value::String(message) => Some(message.clone()),
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}
