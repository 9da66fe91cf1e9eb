use serde_json::{json, Value};

use crate::{error::CallError, types::UiState};

pub const WAITING_MESSAGE: &str = "waiting for request";

/// Receives a snapshot every time the orchestrator changes the UI.
pub trait View: Send + Sync {
    fn render(&self, state: &UiState);
}

/// Two-space indented JSON, key order preserved.
pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn waiting() -> Value {
    json!({ "message": WAITING_MESSAGE })
}

pub fn loading(request: &Value) -> Value {
    json!({ "loading": true, "request": request })
}

pub fn failure(error: &CallError) -> Value {
    json!({ "error": error.to_string() })
}

pub fn bootstrap_failure(error: &CallError, hint: &str) -> Value {
    json!({ "error": error.to_string(), "hint": hint })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_uses_two_space_indent_and_keeps_key_order() {
        let text = pretty(&loading(&json!({ "method": "getSettings", "idInstance": "1" })));
        assert_eq!(
            text,
            "{\n  \"loading\": true,\n  \"request\": {\n    \"method\": \"getSettings\",\n    \"idInstance\": \"1\"\n  }\n}"
        );
    }

    #[test]
    fn failure_carries_only_the_message() {
        let value = failure(&CallError::Builder("bad chat".into()));
        assert_eq!(value, json!({ "error": "bad chat" }));
    }
}
