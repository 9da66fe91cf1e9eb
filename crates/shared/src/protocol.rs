use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::Method;

/// Path of the backend endpoint the client posts built requests to.
pub const CALL_ROUTE: &str = "/api/call";

/// Request produced by the builder and accepted by `POST /api/call`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    pub id_instance: String,
    pub api_token_instance: String,
    pub method: Method,
    pub payload: Map<String, Value>,
}

/// Loosely typed view of an inbound `/api/call` body. The method stays a
/// string so an unknown name surfaces as an upstream validation error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCallRequest {
    #[serde(default)]
    pub id_instance: String,
    #[serde(default)]
    pub api_token_instance: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub payload: Option<Map<String, Value>>,
}

/// `/api/call` response envelope: exactly one of `result` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CallResponse {
    pub fn success(result: Value) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn call_request_uses_camel_case_wire_names() {
        let mut payload = Map::new();
        payload.insert("chatId".into(), json!("1@c.us"));
        let request = CallRequest {
            id_instance: "1101".into(),
            api_token_instance: "token".into(),
            method: Method::SendMessage,
            payload,
        };

        assert_eq!(
            serde_json::to_value(&request).expect("json"),
            json!({
                "idInstance": "1101",
                "apiTokenInstance": "token",
                "method": "sendMessage",
                "payload": { "chatId": "1@c.us" }
            })
        );
    }

    #[test]
    fn raw_request_tolerates_missing_fields() {
        let raw: RawCallRequest = serde_json::from_value(json!({ "method": "x" })).expect("json");
        assert_eq!(raw.method, "x");
        assert!(raw.id_instance.is_empty());
        assert!(raw.payload.is_none());
    }

    #[test]
    fn failure_envelope_omits_result() {
        let body = serde_json::to_value(CallResponse::failure("boom")).expect("json");
        assert_eq!(body, json!({ "error": "boom" }));
    }
}
