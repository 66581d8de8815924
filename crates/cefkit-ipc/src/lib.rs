//! Cross-process message protocol.
//!
//! Coordinates the controller process and script-executor processes over
//! the engine's process-message channel:
//! - [`MessageName`] / [`Message`]: the closed vocabulary and its fixed
//!   positional wire layouts
//! - [`MessageRouter`]: per-process consume / pass-through decision and
//!   dispatch to a [`ProtocolHandler`]
//! - [`ExceptionCapture`]: uncaught exceptions from script to controller
//! - [`ControllerEndpoint`] and [`ScriptEndpoint`]: the application layer
//!   that correlates requests with responses

pub mod callbacks;
pub mod codec;
pub mod controller;
pub mod errors;
pub mod events;
pub mod exception;
pub mod frames;
pub mod objects;
pub mod pending;
pub mod router;
pub mod script;
pub mod vocabulary;

pub use callbacks::ScriptCallbacks;
pub use codec::{
    BoundObject, CallbackInvoke, CallbackReply, EvaluateRequest, FocusedNode, Message,
    MethodCall, Reply,
};
pub use controller::ControllerEndpoint;
pub use errors::{CallError, RequestError};
pub use events::{EventBus, ProtocolEvent};
pub use exception::ExceptionCapture;
pub use frames::FrameTracker;
pub use objects::ObjectRepository;
pub use pending::{PendingRequest, PendingRequests};
pub use router::{MessageRouter, ProtocolHandler, RouterOptions};
pub use script::ScriptEndpoint;
pub use vocabulary::MessageName;

#[cfg(test)]
mod tests;
