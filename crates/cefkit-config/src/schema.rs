//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CefkitConfig {
    pub process: ProcessConfig,
    pub protocol: ProtocolConfig,
    pub logging: LoggingConfig,
}

/// How the engine lays out its processes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Run browser and renderer in one process. The message router passes
    /// every message through in this mode since there is no peer.
    pub single_process: bool,
    /// Frames captured for uncaught exceptions. 0 disables uncaught
    /// exception notifications entirely.
    pub uncaught_exception_stack_size: u32,
    /// Helper executable used for script-executor processes.
    pub browser_subprocess_path: Option<String>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            single_process: false,
            uncaught_exception_stack_size: 10,
            browser_subprocess_path: None,
        }
    }
}

/// Cross-process protocol settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Forward focused-node changes to the controller. Off by default;
    /// the message is passed through unless the host opts in.
    pub focused_node_notifications: bool,
    /// Upper bound on outstanding correlated requests per endpoint.
    pub pending_request_capacity: u32,
    /// How long an application waits for an evaluate-script response.
    pub evaluate_timeout_ms: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            focused_node_notifications: false,
            pending_request_capacity: 1024,
            evaluate_timeout_ms: 5_000,
        }
    }
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}
