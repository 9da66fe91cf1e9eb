use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

pub mod bootstrap;
pub mod error;
pub mod presentation;
pub mod protocol_client;
pub mod transport;
pub mod types;

pub use bootstrap::{
    load_module, BuilderModule, ModuleExports, ModuleLoader, NativeModuleLoader, Readiness,
};
pub use error::CallError;
pub use presentation::View;
pub use protocol_client::RequestBuilder;
pub use transport::{CallTransport, HttpCallTransport};
pub use types::{FormSource, FormValues, UiState};

use crate::{
    bootstrap::REBUILD_HINT,
    presentation::{bootstrap_failure, failure, loading, pretty, waiting},
    protocol_client::build_via,
};

/// Result of pressing a trigger control.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// The control is disabled or does not exist; nothing was done.
    Ignored,
    Completed(Result<Value, CallError>),
}

impl ClickOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ClickOutcome::Completed(Ok(_)))
    }
}

/// Drives one page session: module bootstrap, then one build-and-call flow
/// per click. Owns the UI state and pushes a snapshot to the view after
/// every change.
pub struct CallOrchestrator {
    form: Arc<dyn FormSource>,
    transport: Arc<dyn CallTransport>,
    view: Arc<dyn View>,
    builder: Option<Arc<dyn RequestBuilder>>,
    ui: UiState,
}

impl CallOrchestrator {
    /// Every method gets a trigger control; all start disabled.
    pub fn new<I, S>(
        methods: I,
        form: Arc<dyn FormSource>,
        transport: Arc<dyn CallTransport>,
        view: Arc<dyn View>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let orchestrator = Self {
            form,
            transport,
            view,
            builder: None,
            ui: UiState::new(methods, pretty(&waiting())),
        };
        orchestrator.publish();
        orchestrator
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Runs the readiness gate once. Controls are enabled only when the
    /// module starts; on failure they stay disabled for the session.
    pub async fn bootstrap(&mut self, loader: Option<&dyn ModuleLoader>) -> Result<(), CallError> {
        if self.ui.readiness() != Readiness::Uninitialized {
            return Err(CallError::Bootstrap(
                "module bootstrap was already attempted".to_string(),
            ));
        }

        self.ui.set_readiness(Readiness::Initializing);
        self.publish();

        match load_module(loader).await {
            Ok(exports) => {
                self.builder = exports.request_builder;
                self.ui.set_readiness(Readiness::Ready);
                self.ui.set_all_enabled(true);
                self.publish();
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "module bootstrap failed");
                self.ui.set_readiness(Readiness::Failed);
                self.ui.set_all_enabled(false);
                self.ui
                    .set_display(pretty(&bootstrap_failure(&err, REBUILD_HINT)));
                self.publish();
                Err(err)
            }
        }
    }

    /// Handles a press of the control tagged with `method`. The control is
    /// disabled for the duration of the call and re-enabled afterwards
    /// whatever the outcome, including when the returned future is dropped.
    pub async fn click(&mut self, method: &str) -> ClickOutcome {
        if !self.ui.is_enabled(method) {
            debug!(method, "ignoring click on disabled control");
            return ClickOutcome::Ignored;
        }

        let mut guard = ControlGuard::disable(self, method);
        let result = guard.orchestrator.call_method(method).await;
        match &result {
            Ok(payload) => {
                info!(method, "call succeeded");
                guard.orchestrator.ui.set_display(pretty(payload));
            }
            Err(err) => {
                warn!(method, error = %err, "call failed");
                guard.orchestrator.ui.set_display(pretty(&failure(err)));
            }
        }
        guard.finished = true;
        drop(guard);

        ClickOutcome::Completed(result)
    }

    async fn call_method(&mut self, method: &str) -> Result<Value, CallError> {
        let form = FormValues::collect(self.form.as_ref());
        let request = build_via(self.builder.as_deref(), method, &form)?;

        self.ui.set_display(pretty(&loading(&request)));
        self.publish();

        self.transport.call(&request).await
    }

    fn publish(&self) {
        self.view.render(&self.ui);
    }
}

/// Keeps a trigger control disabled while alive. Dropping it re-enables the
/// control; if the call never finished the display reports the cancellation.
struct ControlGuard<'a> {
    orchestrator: &'a mut CallOrchestrator,
    method: String,
    finished: bool,
}

impl<'a> ControlGuard<'a> {
    fn disable(orchestrator: &'a mut CallOrchestrator, method: &str) -> Self {
        orchestrator.ui.set_enabled(method, false);
        orchestrator.publish();
        Self {
            orchestrator,
            method: method.to_string(),
            finished: false,
        }
    }
}

impl Drop for ControlGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!(method = %self.method, "call cancelled before completion");
            self.orchestrator
                .ui
                .set_display(pretty(&failure(&CallError::cancelled())));
        }
        self.orchestrator.ui.set_enabled(&self.method, true);
        self.orchestrator.publish();
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
