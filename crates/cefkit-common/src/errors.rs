use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Malformed or unexpected cross-process traffic.
///
/// The router never lets these escape: a message that fails to decode is
/// logged and passed through to the engine's default handling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("unknown message name: {0}")]
    UnknownMessage(String),

    #[error("{name}: expected {expected} arguments, got {actual}")]
    Arity {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{name}: argument {index} should be {expected}, got {actual}")]
    ArgumentType {
        name: &'static str,
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{name}: argument {index} is out of range")]
    OutOfRange { name: &'static str, index: usize },

    #[error("frame {0} is not known to this browser")]
    UnknownFrame(i64),
}

/// Failures at the native handle boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("null native handle")]
    NullHandle,

    #[error("native handle {0:#x} is no longer valid")]
    InvalidHandle(usize),

    #[error("callback table already installed on {0:#x}")]
    AlreadyInstalled(usize),

    #[error("native handle {handle:#x} is a {actual}, expected {expected}")]
    KindMismatch {
        handle: usize,
        expected: &'static str,
        actual: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CefkitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}
