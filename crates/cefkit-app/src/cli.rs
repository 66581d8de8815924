use std::path::PathBuf;

use clap::Parser;

/// cefkit: a controller and a script executor over the in-memory engine.
#[derive(Parser, Debug)]
#[command(name = "cefkit", version, about)]
pub struct Args {
    /// URL the sample browser reports as loaded.
    #[arg(long, default_value = "about:blank")]
    pub url: String,

    /// Script evaluated in the main frame.
    #[arg(short, long, default_value = "1+1")]
    pub script: String,

    /// Run both roles in one process. Messages are not routed.
    #[arg(long)]
    pub single_process: bool,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Raise an uncaught exception with this message after evaluating.
    #[arg(long)]
    pub throw: Option<String>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
