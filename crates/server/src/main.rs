use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use greenapi::GreenApiClient;
use shared::protocol::{CallResponse, RawCallRequest, CALL_ROUTE};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Clone)]
struct AppState {
    greenapi: GreenApiClient,
    web_root: PathBuf,
}

const MAX_BODY_BYTES: usize = 1024 * 1024;
const INDEX_FILE: &str = "index.html";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings()?;
    let greenapi =
        GreenApiClient::new(&settings.green_api_base_url).context("init green api client")?;
    info!(green_api = greenapi.base_url(), web_root = %settings.web_root.display(), "configuration loaded");

    let index_path = settings.web_root.join(INDEX_FILE);
    if !index_path.is_file() {
        warn!(
            path = %index_path.display(),
            "index page missing; the static root is optional and GET / will answer 404"
        );
    }

    let state = AppState {
        greenapi,
        web_root: settings.web_root.clone(),
    };
    let app = build_router(Arc::new(state));

    let addr = settings.listen_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(addr = %listener.local_addr()?, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(state.web_root.join("assets"));
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route(CALL_ROUTE, post(handle_call).options(call_options))
        .nest_service("/assets", assets)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, StatusCode> {
    let path = state.web_root.join(INDEX_FILE);
    tokio::fs::read_to_string(&path).await.map(Html).map_err(|error| {
        warn!(path = %path.display(), %error, "index page unavailable");
        StatusCode::NOT_FOUND
    })
}

/// Plain `OPTIONS` without preflight headers; real preflights are answered
/// by the CORS layer.
async fn call_options() -> StatusCode {
    StatusCode::NO_CONTENT
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<CallResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(CallResponse::failure(message)),
    )
}

async fn handle_call(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CallResponse>, (StatusCode, Json<CallResponse>)> {
    let request: RawCallRequest =
        serde_json::from_slice(&body).map_err(|_| bad_request("invalid JSON body"))?;

    let id_instance = request.id_instance.trim();
    let api_token_instance = request.api_token_instance.trim();
    let method = request.method.trim();
    if id_instance.is_empty() || api_token_instance.is_empty() || method.is_empty() {
        return Err(bad_request(
            "idInstance, apiTokenInstance and method are required",
        ));
    }

    let result = state
        .greenapi
        .call(id_instance, api_token_instance, method, request.payload)
        .await
        .map_err(|e| {
            warn!(method, error = %e, "green-api call failed");
            bad_request(e.to_string())
        })?;

    info!(method, "green-api call proxied");
    Ok(Json(CallResponse::success(result)))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
