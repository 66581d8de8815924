pub mod errors;
pub mod exception;
pub mod id;
pub mod message;
pub mod role;
pub mod value;

pub use errors::{BridgeError, CefkitError, ConfigError, ProtocolError};
pub use exception::{ExceptionRecord, StackFrame};
pub use id::{next_correlation_id, BrowserId, FrameId};
pub use message::ProcessMessage;
pub use role::ProcessRole;
pub use value::{ListValue, Value};

pub type Result<T> = std::result::Result<T, CefkitError>;
