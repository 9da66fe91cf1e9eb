use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method as HttpMethod, StatusCode, Uri},
    Router,
};
use tokio::{net::TcpListener, sync::Mutex};

use super::*;

#[derive(Debug, Clone)]
struct SeenRequest {
    method: HttpMethod,
    path: String,
    content_type: Option<String>,
    accept: Option<String>,
    body: Vec<u8>,
}

#[derive(Clone)]
struct UpstreamState {
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    status: StatusCode,
    reply: &'static str,
}

async fn record(
    State(state): State<UpstreamState>,
    method: HttpMethod,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    state.seen.lock().await.push(SeenRequest {
        method,
        path: uri.path().to_string(),
        content_type: header_text(header::CONTENT_TYPE),
        accept: header_text(header::ACCEPT),
        body: body.to_vec(),
    });
    (state.status, state.reply)
}

async fn spawn_upstream(
    status: StatusCode,
    reply: &'static str,
) -> (String, Arc<Mutex<Vec<SeenRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(record).with_state(UpstreamState {
        seen: seen.clone(),
        status,
        reply,
    });
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{addr}"), seen)
}

#[test]
fn base_url_is_trimmed_and_validated() {
    assert_eq!(
        normalize_base_url("  https://api.green-api.com//  ").expect("valid"),
        "https://api.green-api.com"
    );
    assert!(matches!(
        normalize_base_url("   "),
        Err(GreenApiError::MissingBaseUrl)
    ));
    assert!(matches!(
        normalize_base_url("api.green-api.com"),
        Err(GreenApiError::InvalidBaseUrl(_))
    ));
    assert!(matches!(
        normalize_base_url("ftp://api.green-api.com"),
        Err(GreenApiError::UnsupportedScheme(scheme)) if scheme == "ftp"
    ));
}

#[test]
fn endpoint_escapes_instance_and_token_segments() {
    let client = GreenApiClient::new("https://api.green-api.com/v1/").expect("client");
    let url = client
        .endpoint("11/01", Method::SendMessage, "tok en?x")
        .expect("endpoint");
    assert_eq!(
        url.as_str(),
        "https://api.green-api.com/v1/waInstance11%2F01/sendMessage/tok%20en%3Fx"
    );
}

#[tokio::test]
async fn read_only_methods_use_get_without_body() {
    let (base_url, seen) = spawn_upstream(StatusCode::OK, r#"{"stateInstance":"authorized"}"#).await;
    let client = GreenApiClient::new(&base_url).expect("client");

    let result = client
        .call("1101", "secret", "getStateInstance", None)
        .await
        .expect("call");
    assert_eq!(result, json!({ "stateInstance": "authorized" }));

    let seen = seen.lock().await;
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, HttpMethod::GET);
    assert_eq!(seen[0].path, "/waInstance1101/getStateInstance/secret");
    assert_eq!(seen[0].accept.as_deref(), Some("application/json"));
    assert!(seen[0].body.is_empty());
}

#[tokio::test]
async fn send_methods_post_json_payload() {
    let (base_url, seen) = spawn_upstream(StatusCode::OK, r#"{"idMessage":"ABC"}"#).await;
    let client = GreenApiClient::new(&base_url).expect("client");

    let mut payload = Map::new();
    payload.insert("chatId".into(), json!("79001234567@c.us"));
    payload.insert("message".into(), json!("hi"));
    let result = client
        .call("1101", "secret", "sendMessage", Some(payload))
        .await
        .expect("call");
    assert_eq!(result, json!({ "idMessage": "ABC" }));

    let seen = seen.lock().await;
    assert_eq!(seen[0].method, HttpMethod::POST);
    assert_eq!(seen[0].content_type.as_deref(), Some("application/json"));
    let body: Value = serde_json::from_slice(&seen[0].body).expect("json body");
    assert_eq!(body, json!({ "chatId": "79001234567@c.us", "message": "hi" }));
}

#[tokio::test]
async fn post_without_payload_sends_empty_object() {
    let (base_url, seen) = spawn_upstream(StatusCode::OK, "{}").await;
    let client = GreenApiClient::new(&base_url).expect("client");

    client
        .call("1101", "secret", "sendFileByUrl", None)
        .await
        .expect("call");

    let seen = seen.lock().await;
    assert_eq!(seen[0].body, b"{}");
}

#[tokio::test]
async fn unsupported_method_never_reaches_upstream() {
    let (base_url, seen) = spawn_upstream(StatusCode::OK, "{}").await;
    let client = GreenApiClient::new(&base_url).expect("client");

    let err = client
        .call("1101", "secret", "reboot", None)
        .await
        .expect_err("unsupported");
    assert_eq!(err.to_string(), "unsupported method \"reboot\"");
    assert!(seen.lock().await.is_empty());
}

#[tokio::test]
async fn error_status_carries_trimmed_body() {
    let (base_url, _seen) = spawn_upstream(StatusCode::FORBIDDEN, "  forbidden instance \n").await;
    let client = GreenApiClient::new(&base_url).expect("client");

    let err = client
        .call("1101", "secret", "getSettings", None)
        .await
        .expect_err("status");
    assert_eq!(err.to_string(), "green-api status 403: forbidden instance");
}

#[tokio::test]
async fn empty_error_body_is_named() {
    let (base_url, _seen) = spawn_upstream(StatusCode::BAD_GATEWAY, "").await;
    let client = GreenApiClient::new(&base_url).expect("client");

    let err = client
        .call("1101", "secret", "getSettings", None)
        .await
        .expect_err("status");
    assert_eq!(err.to_string(), "green-api status 502: empty response");
}

#[tokio::test]
async fn empty_success_body_becomes_null() {
    let (base_url, _seen) = spawn_upstream(StatusCode::OK, "").await;
    let client = GreenApiClient::new(&base_url).expect("client");

    let result = client
        .call("1101", "secret", "getSettings", None)
        .await
        .expect("call");
    assert_eq!(result, Value::Null);
}

#[tokio::test]
async fn non_json_success_body_is_wrapped() {
    let (base_url, _seen) = spawn_upstream(StatusCode::OK, "plain text").await;
    let client = GreenApiClient::new(&base_url).expect("client");

    let result = client
        .call("1101", "secret", "getSettings", None)
        .await
        .expect("call");
    assert_eq!(result, json!({ "raw": "plain text" }));
}

#[tokio::test]
async fn transport_failure_does_not_expose_the_token() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let client = GreenApiClient::new(&format!("http://{addr}")).expect("client");

    let err = client
        .call("1101", "SUPERSECRETTOKEN", "getSettings", None)
        .await
        .expect_err("closed port");
    assert!(matches!(err, GreenApiError::Send(_)));
    assert!(!err.to_string().contains("SUPERSECRETTOKEN"), "{err}");
    assert!(!format!("{err:?}").contains("SUPERSECRETTOKEN"), "{err:?}");
}
