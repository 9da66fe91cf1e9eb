use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use shared::{error::error_field, protocol::CALL_ROUTE};
use tracing::{debug, warn};

use crate::error::CallError;

/// Carries a built request to the backend and returns its `result`.
#[async_trait]
pub trait CallTransport: Send + Sync {
    async fn call(&self, request: &Value) -> Result<Value, CallError>;
}

pub struct HttpCallTransport {
    http: Client,
    endpoint: String,
}

impl HttpCallTransport {
    pub fn new(server_url: &str) -> Self {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}{CALL_ROUTE}", server_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CallTransport for HttpCallTransport {
    async fn call(&self, request: &Value) -> Result<Value, CallError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| CallError::Remote(format!("send request: {e}")))?;
        let status = response.status();
        let raw_body = response
            .bytes()
            .await
            .map_err(|e| CallError::Remote(format!("read response: {e}")))?;
        debug!(status = status.as_u16(), bytes = raw_body.len(), "backend responded");

        let body: Value = serde_json::from_slice(&raw_body).map_err(|_| {
            warn!(status = status.as_u16(), "backend response is not JSON");
            CallError::Remote(format!("HTTP {}: response is not valid JSON", status.as_u16()))
        })?;

        interpret_response(status, body)
    }
}

/// Failure when the status is not 2xx or the body carries an `error`;
/// otherwise the body's `result` (`null` when absent).
pub fn interpret_response(status: StatusCode, body: Value) -> Result<Value, CallError> {
    let error = error_field(&body);
    if !status.is_success() || error.is_some() {
        return Err(CallError::Remote(
            error.unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        ));
    }

    Ok(match body {
        Value::Object(mut fields) => fields.remove("result").unwrap_or(Value::Null),
        _ => Value::Null,
    })
}
