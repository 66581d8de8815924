//! The closed set of message names and who may send them to whom.

use std::fmt;
use std::str::FromStr;

use cefkit_common::{ProcessRole, ProtocolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageName {
    ContextCreated,
    ContextReleased,
    UncaughtException,
    EvaluateRequest,
    EvaluateResponse,
    MethodCallRequest,
    MethodCallResponse,
    CallbackInvokeRequest,
    CallbackInvokeResponse,
    CallbackDestroyRequest,
    ObjectsBound,
    FocusedNodeChanged,
}

/// Which processes may receive a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Sent by a script executor, handled by the controller.
    ToController,
    /// Either side may send; the other handles it.
    Either,
}

impl MessageName {
    pub const ALL: [MessageName; 12] = [
        MessageName::ContextCreated,
        MessageName::ContextReleased,
        MessageName::UncaughtException,
        MessageName::EvaluateRequest,
        MessageName::EvaluateResponse,
        MessageName::MethodCallRequest,
        MessageName::MethodCallResponse,
        MessageName::CallbackInvokeRequest,
        MessageName::CallbackInvokeResponse,
        MessageName::CallbackDestroyRequest,
        MessageName::ObjectsBound,
        MessageName::FocusedNodeChanged,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageName::ContextCreated => "on-context-created-request",
            MessageName::ContextReleased => "on-context-released-request",
            MessageName::UncaughtException => "on-uncaught-exception",
            MessageName::EvaluateRequest => "evaluate-script-request",
            MessageName::EvaluateResponse => "evaluate-script-response",
            MessageName::MethodCallRequest => "async-method-call-request",
            MessageName::MethodCallResponse => "async-method-call-response",
            MessageName::CallbackInvokeRequest => "callback-invoke-request",
            MessageName::CallbackInvokeResponse => "callback-invoke-response",
            MessageName::CallbackDestroyRequest => "callback-destroy-request",
            MessageName::ObjectsBound => "objects-bound-in-script",
            MessageName::FocusedNodeChanged => "focused-node-changed",
        }
    }

    /// Number of argument slots. Every name has a fixed arity.
    pub fn arity(self) -> usize {
        match self {
            MessageName::ContextCreated
            | MessageName::ContextReleased
            | MessageName::CallbackDestroyRequest
            | MessageName::ObjectsBound
            | MessageName::FocusedNodeChanged => 1,
            MessageName::UncaughtException => 7,
            MessageName::EvaluateRequest
            | MessageName::EvaluateResponse
            | MessageName::MethodCallResponse
            | MessageName::CallbackInvokeRequest => 3,
            MessageName::MethodCallRequest | MessageName::CallbackInvokeResponse => 4,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            MessageName::ContextCreated
            | MessageName::ContextReleased
            | MessageName::UncaughtException
            | MessageName::ObjectsBound
            | MessageName::FocusedNodeChanged => Direction::ToController,
            _ => Direction::Either,
        }
    }

    /// Whether a process with role `receiver` handles this message when it
    /// arrives from the peer role.
    pub fn handled_by(self, receiver: ProcessRole) -> bool {
        match self.direction() {
            Direction::ToController => receiver == ProcessRole::Controller,
            Direction::Either => true,
        }
    }
}

impl FromStr for MessageName {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownMessage(s.to_owned()))
    }
}

impl fmt::Display for MessageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
