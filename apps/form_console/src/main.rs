use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::{bail, Result};
use clap::Parser;
use client_core::{
    CallOrchestrator, HttpCallTransport, ModuleLoader, NativeModuleLoader, UiState, View,
};
use shared::domain::{FieldId, Method};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Fills the form from flags, bootstraps the request builder and presses
/// one trigger control per METHOD against the backend.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server_url: String,
    #[arg(long, default_value = "")]
    id_instance: String,
    #[arg(long, default_value = "")]
    api_token_instance: String,
    #[arg(long, default_value = "")]
    send_message_chat_id: String,
    #[arg(long, default_value = "")]
    send_message_text: String,
    #[arg(long, default_value = "")]
    send_file_chat_id: String,
    #[arg(long, default_value = "")]
    send_file_url: String,
    /// Start without a module loader; every control stays disabled.
    #[arg(long)]
    skip_module: bool,
    #[arg(required = true)]
    methods: Vec<Method>,
}

impl Args {
    fn form(&self) -> BTreeMap<FieldId, String> {
        [
            (FieldId::IdInstance, &self.id_instance),
            (FieldId::ApiTokenInstance, &self.api_token_instance),
            (FieldId::SendMessageChatId, &self.send_message_chat_id),
            (FieldId::SendMessageText, &self.send_message_text),
            (FieldId::SendFileChatId, &self.send_file_chat_id),
            (FieldId::SendFileUrl, &self.send_file_url),
        ]
        .into_iter()
        .map(|(field, value)| (field, value.clone()))
        .collect()
    }
}

/// Prints status and enabled controls on every render, and the display
/// text whenever it changes.
#[derive(Default)]
struct TerminalView {
    last_display: Mutex<Option<String>>,
}

impl View for TerminalView {
    fn render(&self, state: &UiState) {
        let enabled: Vec<&str> = state
            .controls()
            .filter(|(_, enabled)| *enabled)
            .map(|(method, _)| method)
            .collect();
        println!("[{}] enabled: {}", state.status_text(), enabled.join(", "));

        let mut last = self
            .last_display
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if last.as_deref() != Some(state.display()) {
            println!("{}", state.display());
            *last = Some(state.display().to_string());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let transport = HttpCallTransport::new(&args.server_url);
    info!(endpoint = transport.endpoint(), "using backend");

    let mut orchestrator = CallOrchestrator::new(
        Method::ALL.iter().map(|method| method.as_str()),
        Arc::new(args.form()),
        Arc::new(transport),
        Arc::new(TerminalView::default()),
    );

    let loader = NativeModuleLoader;
    let loader: Option<&dyn ModuleLoader> = if args.skip_module {
        None
    } else {
        Some(&loader)
    };
    if let Err(err) = orchestrator.bootstrap(loader).await {
        bail!("bootstrap failed: {err}");
    }

    let mut failed = 0;
    for method in &args.methods {
        if !orchestrator.click(method.as_str()).await.is_success() {
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{failed} of {} calls failed", args.methods.len());
    }
    Ok(())
}
