//! cefkit: runs a controller and a script executor side by side.
//!
//! Each role gets its own in-memory engine. Process messages travel
//! between them as JSON frames over tokio channels, the way they would
//! cross a process boundary. The sample evaluates `--script` in the main
//! frame, prints the result and echoes protocol events as JSON lines.

mod cli;
mod evaluator;
mod link;
mod processes;
mod session;

use std::process::ExitCode;
use std::time::Duration;

use cefkit_common::{BridgeError, ConfigError, ExceptionRecord, Value};
use cefkit_config::CefkitConfig;
use cefkit_ipc::CallError;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::session::Session;

const EVENT_WAIT: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("evaluation failed: {0}")]
    Evaluate(#[from] CallError),

    #[error("script error: {}", .0.message)]
    Script(ExceptionRecord),

    #[error("main frame has no script context")]
    NoContext,
}

fn load_config(args: &Args) -> Result<CefkitConfig, ConfigError> {
    match &args.config {
        Some(path) => cefkit_config::load_from_path(path),
        None => cefkit_config::load_config(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = cli::parse();

    let loaded = load_config(&args);
    let mut config = loaded.as_ref().cloned().unwrap_or_default();
    if args.single_process {
        config.process.single_process = true;
    }

    let directive = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.as_directive().to_owned());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
        )
        .init();

    if let Err(e) = &loaded {
        tracing::warn!(error = %e, "config not loaded, using defaults");
    }

    match run(&args, &config).await {
        Ok(value) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("cefkit: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args, config: &CefkitConfig) -> Result<Value, RunError> {
    let session = Session::start(config, &args.url, EVENT_WAIT)?;
    let result = session.drive(&args.script, args.throw.as_deref()).await;
    session.close().await;
    result
}
