//! Loading the module that provides the request builder.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::{error::CallError, protocol_client::RequestBuilder};

/// Asset path the builder module is served from.
pub const MODULE_ASSET_PATH: &str = "/assets/request_builder.wasm";

pub const REBUILD_HINT: &str = "rebuild the request builder module: cargo build -p request_builder";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

impl Readiness {
    pub fn status_text(self) -> &'static str {
        match self {
            Readiness::Uninitialized => "module: waiting",
            Readiness::Initializing => "module: loading",
            Readiness::Ready => "module: on",
            Readiness::Failed => "module: failed",
        }
    }
}

/// What a started module makes available to the page. A module may run
/// without registering a builder.
#[derive(Default)]
pub struct ModuleExports {
    pub request_builder: Option<Arc<dyn RequestBuilder>>,
}

/// Host mechanism that instantiates the module from its source.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    fn source(&self) -> &str;
    async fn instantiate(&self) -> Result<Box<dyn BuilderModule>>;
}

/// An instantiated module that has not been started yet.
pub trait BuilderModule: Send {
    fn start(self: Box<Self>) -> Result<ModuleExports>;
}

/// Instantiate-then-start. Errors come back as [`CallError::Configuration`]
/// when there is no loader and [`CallError::Bootstrap`] otherwise.
pub async fn load_module(loader: Option<&dyn ModuleLoader>) -> Result<ModuleExports, CallError> {
    let loader = loader.ok_or_else(CallError::loader_unavailable)?;
    let source = loader.source().to_string();

    let exports = instantiate_and_start(loader, &source)
        .await
        .map_err(|e| CallError::Bootstrap(format!("{e:#}")))?;

    info!(
        %source,
        exports_builder = exports.request_builder.is_some(),
        "module started"
    );
    Ok(exports)
}

async fn instantiate_and_start(loader: &dyn ModuleLoader, source: &str) -> Result<ModuleExports> {
    let module = loader
        .instantiate()
        .await
        .with_context(|| format!("instantiate module from {source}"))?;
    module.start().context("start module")
}

/// Loader for the builder linked into this binary.
pub struct NativeModuleLoader;

struct NativeModule;

#[async_trait]
impl ModuleLoader for NativeModuleLoader {
    fn source(&self) -> &str {
        MODULE_ASSET_PATH
    }

    async fn instantiate(&self) -> Result<Box<dyn BuilderModule>> {
        Ok(Box::new(NativeModule))
    }
}

impl BuilderModule for NativeModule {
    fn start(self: Box<Self>) -> Result<ModuleExports> {
        Ok(ModuleExports {
            request_builder: Some(Arc::new(request_builder::build_request)),
        })
    }
}
