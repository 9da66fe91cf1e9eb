use std::time::Duration;

use reqwest::{header, Client};
use serde_json::{json, Map, Value};
use shared::domain::{Method, UnsupportedMethod};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum GreenApiError {
    #[error("green api base url is required")]
    MissingBaseUrl,
    #[error("invalid green api base url {0:?}")]
    InvalidBaseUrl(String),
    #[error("unsupported green api base url scheme {0:?}")]
    UnsupportedScheme(String),
    #[error(transparent)]
    UnsupportedMethod(#[from] UnsupportedMethod),
    #[error("build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("send request: {0}")]
    Send(#[source] reqwest::Error),
    #[error("read response: {0}")]
    Read(#[source] reqwest::Error),
    #[error("green-api status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Trims whitespace and trailing slashes and checks that the result is an
/// absolute `http`/`https` URL.
pub fn normalize_base_url(raw: &str) -> Result<String, GreenApiError> {
    let normalized = raw.trim().trim_end_matches('/');
    if normalized.is_empty() {
        return Err(GreenApiError::MissingBaseUrl);
    }

    let parsed = Url::parse(normalized)
        .map_err(|_| GreenApiError::InvalidBaseUrl(normalized.to_string()))?;
    if !matches!(parsed.host_str(), Some(host) if !host.is_empty()) {
        return Err(GreenApiError::InvalidBaseUrl(normalized.to_string()));
    }
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(GreenApiError::UnsupportedScheme(parsed.scheme().to_string()));
    }

    Ok(normalized.to_string())
}

#[derive(Debug, Clone)]
pub struct GreenApiClient {
    base_url: Url,
    http: Client,
}

impl GreenApiClient {
    pub fn new(base_url: &str) -> Result<Self, GreenApiError> {
        let normalized = normalize_base_url(base_url)?;
        let base_url =
            Url::parse(&normalized).map_err(|_| GreenApiError::InvalidBaseUrl(normalized))?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(GreenApiError::Client)?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// `<base>/waInstance<id>/<method>/<token>` with the instance id and
    /// token escaped as single path segments.
    pub fn endpoint(
        &self,
        id_instance: &str,
        method: Method,
        api_token_instance: &str,
    ) -> Result<Url, GreenApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GreenApiError::InvalidBaseUrl(self.base_url().to_string()))?
            .pop_if_empty()
            .push(&format!("waInstance{id_instance}"))
            .push(method.as_str())
            .push(api_token_instance);
        Ok(url)
    }

    pub async fn call(
        &self,
        id_instance: &str,
        api_token_instance: &str,
        method: &str,
        payload: Option<Map<String, Value>>,
    ) -> Result<Value, GreenApiError> {
        let method: Method = method.parse()?;
        let url = self.endpoint(id_instance, method, api_token_instance)?;

        let request = if method.has_body() {
            self.http.post(url).json(&payload.unwrap_or_default())
        } else {
            self.http.get(url)
        };

        let response = request
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| GreenApiError::Send(e.without_url()))?;
        let status = response.status();
        let raw_body = response
            .bytes()
            .await
            .map_err(|e| GreenApiError::Read(e.without_url()))?;
        debug!(%method, status = status.as_u16(), bytes = raw_body.len(), "green-api call finished");

        if status.is_client_error() || status.is_server_error() {
            let text = String::from_utf8_lossy(&raw_body);
            let body = match text.trim() {
                "" => "empty response".to_string(),
                trimmed => trimmed.to_string(),
            };
            warn!(%method, status = status.as_u16(), "green-api rejected call");
            return Err(GreenApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        if raw_body.is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_slice(&raw_body)
            .unwrap_or_else(|_| json!({ "raw": String::from_utf8_lossy(&raw_body) })))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
