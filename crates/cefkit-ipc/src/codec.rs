//! Typed messages and their positional wire layouts.
//!
//! Argument positions are the field names: each message name always has
//! the same arity and the same type at each position on both ends.
//! Variadic arguments travel as one nested list slot.

use cefkit_bridge::Browser;
use cefkit_common::{
    ExceptionRecord, FrameId, ListValue, ProcessMessage, ProcessRole, ProtocolError, Value,
};
use serde::Serialize;
use tracing::debug;

use crate::vocabulary::MessageName;

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluateRequest {
    pub id: i64,
    pub frame_id: FrameId,
    pub script: String,
}

/// The answer to a correlated request. `Err` carries the peer's error text.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub id: i64,
    pub result: Result<Value, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub id: i64,
    pub object_id: i64,
    pub method: String,
    pub args: ListValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallbackInvoke {
    pub callback_id: i64,
    pub id: i64,
    pub args: ListValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallbackReply {
    pub callback_id: i64,
    pub reply: Reply,
}

/// A native object exposed to page script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundObject {
    pub name: String,
    pub is_cached: bool,
    pub already_bound: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusedNode {
    pub tag_name: String,
    pub editable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    ContextCreated { frame_id: FrameId },
    ContextReleased { frame_id: FrameId },
    UncaughtException {
        frame_id: FrameId,
        exception: ExceptionRecord,
    },
    EvaluateRequest(EvaluateRequest),
    EvaluateResponse(Reply),
    MethodCallRequest(MethodCall),
    MethodCallResponse(Reply),
    CallbackInvokeRequest(CallbackInvoke),
    CallbackInvokeResponse(CallbackReply),
    CallbackDestroyRequest { callback_id: i64 },
    ObjectsBound(Vec<BoundObject>),
    /// `None` when focus left every editable node.
    FocusedNodeChanged(Option<FocusedNode>),
}

impl Message {
    pub fn name(&self) -> MessageName {
        match self {
            Message::ContextCreated { .. } => MessageName::ContextCreated,
            Message::ContextReleased { .. } => MessageName::ContextReleased,
            Message::UncaughtException { .. } => MessageName::UncaughtException,
            Message::EvaluateRequest(_) => MessageName::EvaluateRequest,
            Message::EvaluateResponse(_) => MessageName::EvaluateResponse,
            Message::MethodCallRequest(_) => MessageName::MethodCallRequest,
            Message::MethodCallResponse(_) => MessageName::MethodCallResponse,
            Message::CallbackInvokeRequest(_) => MessageName::CallbackInvokeRequest,
            Message::CallbackInvokeResponse(_) => MessageName::CallbackInvokeResponse,
            Message::CallbackDestroyRequest { .. } => MessageName::CallbackDestroyRequest,
            Message::ObjectsBound(_) => MessageName::ObjectsBound,
            Message::FocusedNodeChanged(_) => MessageName::FocusedNodeChanged,
        }
    }

    pub fn encode(&self) -> ProcessMessage {
        let mut args = ListValue::new();
        match self {
            Message::ContextCreated { frame_id } | Message::ContextReleased { frame_id } => {
                args.push(frame_id.0);
            }
            Message::UncaughtException {
                frame_id,
                exception,
            } => {
                args.push(frame_id.0);
                args.push(exception.message.as_str());
                args.push(exception.line_number);
                args.push(exception.start_position);
                args.push(exception.end_position);
                args.push(exception.start_column);
                args.push(exception.end_column);
            }
            Message::EvaluateRequest(req) => {
                args.push(req.id);
                args.push(req.frame_id.0);
                args.push(req.script.as_str());
            }
            Message::EvaluateResponse(reply) | Message::MethodCallResponse(reply) => {
                push_reply(&mut args, reply);
            }
            Message::MethodCallRequest(call) => {
                args.push(call.id);
                args.push(call.object_id);
                args.push(call.method.as_str());
                args.push(call.args.clone());
            }
            Message::CallbackInvokeRequest(invoke) => {
                args.push(invoke.callback_id);
                args.push(invoke.id);
                args.push(invoke.args.clone());
            }
            Message::CallbackInvokeResponse(reply) => {
                args.push(reply.callback_id);
                push_reply(&mut args, &reply.reply);
            }
            Message::CallbackDestroyRequest { callback_id } => {
                args.push(*callback_id);
            }
            Message::ObjectsBound(objects) => {
                let list: ListValue = objects
                    .iter()
                    .map(|o| {
                        let mut entry = ListValue::new();
                        entry.push(o.name.as_str());
                        entry.push(o.is_cached);
                        entry.push(o.already_bound);
                        Value::List(entry)
                    })
                    .collect();
                args.push(list);
            }
            Message::FocusedNodeChanged(node) => {
                let mut entry = ListValue::new();
                if let Some(node) = node {
                    entry.push(node.tag_name.as_str());
                    entry.push(node.editable);
                }
                args.push(entry);
            }
        }
        ProcessMessage::with_arguments(self.name().as_str(), args)
    }

    /// Encode and send to the process with role `target` in `browser`.
    pub fn send(&self, browser: &Browser, target: ProcessRole) -> bool {
        let sent = browser.send_process_message(target, &self.encode());
        if !sent {
            debug!(name = %self.name(), ?target, "send refused");
        }
        sent
    }

    pub fn decode(message: &ProcessMessage) -> Result<Self, ProtocolError> {
        let name: MessageName = message.name().parse()?;
        let args = Args::top_level(name, message.arguments())?;

        let decoded = match name {
            MessageName::ContextCreated => Message::ContextCreated {
                frame_id: FrameId(args.int(0)?),
            },
            MessageName::ContextReleased => Message::ContextReleased {
                frame_id: FrameId(args.int(0)?),
            },
            MessageName::UncaughtException => Message::UncaughtException {
                frame_id: FrameId(args.int(0)?),
                exception: ExceptionRecord {
                    message: args.string(1)?,
                    line_number: args.int32(2)?,
                    start_position: args.int32(3)?,
                    end_position: args.int32(4)?,
                    start_column: args.int32(5)?,
                    end_column: args.int32(6)?,
                },
            },
            MessageName::EvaluateRequest => Message::EvaluateRequest(EvaluateRequest {
                id: args.int(0)?,
                frame_id: FrameId(args.int(1)?),
                script: args.string(2)?,
            }),
            MessageName::EvaluateResponse => Message::EvaluateResponse(args.reply(0)?),
            MessageName::MethodCallRequest => Message::MethodCallRequest(MethodCall {
                id: args.int(0)?,
                object_id: args.int(1)?,
                method: args.string(2)?,
                args: args.list(3)?.clone(),
            }),
            MessageName::MethodCallResponse => Message::MethodCallResponse(args.reply(0)?),
            MessageName::CallbackInvokeRequest => Message::CallbackInvokeRequest(CallbackInvoke {
                callback_id: args.int(0)?,
                id: args.int(1)?,
                args: args.list(2)?.clone(),
            }),
            MessageName::CallbackInvokeResponse => {
                Message::CallbackInvokeResponse(CallbackReply {
                    callback_id: args.int(0)?,
                    reply: args.reply(1)?,
                })
            }
            MessageName::CallbackDestroyRequest => Message::CallbackDestroyRequest {
                callback_id: args.int(0)?,
            },
            MessageName::ObjectsBound => {
                let objects = args
                    .list(0)?
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| bound_object(name, i, entry))
                    .collect::<Result<_, _>>()?;
                Message::ObjectsBound(objects)
            }
            MessageName::FocusedNodeChanged => {
                let node = args.list(0)?;
                let node = if node.is_empty() {
                    None
                } else {
                    let node = Args::new(name, node).expect_len(2)?;
                    Some(FocusedNode {
                        tag_name: node.string(0)?,
                        editable: node.bool(1)?,
                    })
                };
                Message::FocusedNodeChanged(node)
            }
        };
        Ok(decoded)
    }
}

fn push_reply(args: &mut ListValue, reply: &Reply) {
    args.push(reply.id);
    match &reply.result {
        Ok(value) => {
            args.push(true);
            args.push(value.clone());
        }
        Err(error) => {
            args.push(false);
            args.push(error.as_str());
        }
    }
}

fn bound_object(
    name: MessageName,
    index: usize,
    entry: &Value,
) -> Result<BoundObject, ProtocolError> {
    let Value::List(fields) = entry else {
        return Err(ProtocolError::ArgumentType {
            name: name.as_str(),
            index,
            expected: "list",
            actual: entry.type_name(),
        });
    };
    let fields = Args::new(name, fields).expect_len(3)?;
    Ok(BoundObject {
        name: fields.string(0)?,
        is_cached: fields.bool(1)?,
        already_bound: fields.bool(2)?,
    })
}

/// Position-checked reader over an argument list.
struct Args<'a> {
    name: MessageName,
    list: &'a ListValue,
}

impl<'a> Args<'a> {
    fn new(name: MessageName, list: &'a ListValue) -> Self {
        Self { name, list }
    }

    /// Reader over a message's own arguments, checked against its arity.
    fn top_level(name: MessageName, list: &'a ListValue) -> Result<Self, ProtocolError> {
        Self::new(name, list).expect_len(name.arity())
    }

    fn expect_len(self, expected: usize) -> Result<Self, ProtocolError> {
        if self.list.len() != expected {
            return Err(ProtocolError::Arity {
                name: self.name.as_str(),
                expected,
                actual: self.list.len(),
            });
        }
        Ok(self)
    }

    fn get(&self, index: usize) -> Result<&'a Value, ProtocolError> {
        self.list.get(index).ok_or(ProtocolError::Arity {
            name: self.name.as_str(),
            expected: index + 1,
            actual: self.list.len(),
        })
    }

    fn mismatch(&self, index: usize, expected: &'static str, actual: &Value) -> ProtocolError {
        ProtocolError::ArgumentType {
            name: self.name.as_str(),
            index,
            expected,
            actual: actual.type_name(),
        }
    }

    fn int(&self, index: usize) -> Result<i64, ProtocolError> {
        let value = self.get(index)?;
        value.as_int().ok_or_else(|| self.mismatch(index, "int", value))
    }

    fn int32(&self, index: usize) -> Result<i32, ProtocolError> {
        i32::try_from(self.int(index)?).map_err(|_| ProtocolError::OutOfRange {
            name: self.name.as_str(),
            index,
        })
    }

    fn bool(&self, index: usize) -> Result<bool, ProtocolError> {
        let value = self.get(index)?;
        value.as_bool().ok_or_else(|| self.mismatch(index, "bool", value))
    }

    fn string(&self, index: usize) -> Result<String, ProtocolError> {
        let value = self.get(index)?;
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| self.mismatch(index, "string", value))
    }

    fn list(&self, index: usize) -> Result<&'a ListValue, ProtocolError> {
        let value = self.get(index)?;
        value.as_list().ok_or_else(|| self.mismatch(index, "list", value))
    }

    /// `[id, success, value]` starting at `index`.
    fn reply(&self, index: usize) -> Result<Reply, ProtocolError> {
        let id = self.int(index)?;
        let result = if self.bool(index + 1)? {
            Ok(self.get(index + 2)?.clone())
        } else {
            Err(self.string(index + 2)?)
        };
        Ok(Reply { id, result })
    }
}

#[cfg(test)]
mod tests;
