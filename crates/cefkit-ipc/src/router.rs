//! Per-process dispatch of inbound process messages.

use std::sync::Weak;

use cefkit_bridge::{Browser, Frame, MessageDisposition};
use cefkit_common::{ExceptionRecord, FrameId, ProcessMessage, ProcessRole};
use cefkit_config::CefkitConfig;
use tracing::{debug, warn};

use crate::codec::{
    BoundObject, CallbackInvoke, CallbackReply, EvaluateRequest, FocusedNode, Message, MethodCall,
    Reply,
};
use crate::exception::ExceptionCapture;
use crate::vocabulary::MessageName;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterOptions {
    /// No peer process exists; every message passes through.
    pub single_process: bool,
    /// Consume `focused-node-changed` instead of passing it through.
    pub focused_node_notifications: bool,
}

impl RouterOptions {
    pub fn from_config(config: &CefkitConfig) -> Self {
        Self {
            single_process: config.process.single_process,
            focused_node_notifications: config.protocol.focused_node_notifications,
        }
    }
}

/// Local handlers for decoded messages. Every method defaults to a no-op.
///
/// Handlers run on the thread that delivered the message and must not
/// block waiting for another message.
pub trait ProtocolHandler: Send + Sync {
    fn on_context_created(&self, _browser: &Browser, _frame: &Frame) {}

    fn on_context_released(&self, _browser: &Browser, _frame: &Frame) {}

    fn on_uncaught_exception(
        &self,
        _browser: &Browser,
        _frame: &Frame,
        _exception: &ExceptionRecord,
    ) {
    }

    fn on_evaluate_request(&self, _browser: &Browser, _request: EvaluateRequest) {}

    fn on_evaluate_response(&self, _browser: &Browser, _reply: Reply) {}

    fn on_method_call_request(&self, _browser: &Browser, _call: MethodCall) {}

    fn on_method_call_response(&self, _browser: &Browser, _reply: Reply) {}

    fn on_callback_invoke_request(&self, _browser: &Browser, _invoke: CallbackInvoke) {}

    fn on_callback_invoke_response(&self, _browser: &Browser, _reply: CallbackReply) {}

    fn on_callback_destroy_request(&self, _browser: &Browser, _callback_id: i64) {}

    fn on_objects_bound(&self, _browser: &Browser, _objects: Vec<BoundObject>) {}

    fn on_focused_node_changed(&self, _browser: &Browser, _node: Option<FocusedNode>) {}
}

/// Decides consume vs. pass-through for each inbound message and invokes
/// the matching [`ProtocolHandler`] method.
///
/// Nothing here fails loudly: unknown names, messages for the wrong role,
/// malformed arguments and missing companions all pass through so the
/// engine's default handling proceeds.
pub struct MessageRouter {
    role: ProcessRole,
    options: RouterOptions,
    handler: Weak<dyn ProtocolHandler>,
}

impl MessageRouter {
    pub fn new(
        role: ProcessRole,
        options: RouterOptions,
        handler: Weak<dyn ProtocolHandler>,
    ) -> Self {
        Self {
            role,
            options,
            handler,
        }
    }

    pub fn role(&self) -> ProcessRole {
        self.role
    }

    pub fn options(&self) -> RouterOptions {
        self.options
    }

    /// The routing-table outcome for `name` arriving from `source`, before
    /// any decoding.
    pub fn decide(&self, name: &str, source: ProcessRole) -> MessageDisposition {
        if self.options.single_process || source == self.role {
            return MessageDisposition::PassThrough;
        }
        let Ok(name) = name.parse::<MessageName>() else {
            return MessageDisposition::PassThrough;
        };
        if !name.handled_by(self.role) {
            return MessageDisposition::PassThrough;
        }
        if name == MessageName::FocusedNodeChanged && !self.options.focused_node_notifications {
            return MessageDisposition::PassThrough;
        }
        MessageDisposition::Consume
    }

    pub fn route(
        &self,
        browser: &Browser,
        source: ProcessRole,
        message: &ProcessMessage,
    ) -> MessageDisposition {
        let name = message.name();
        if self.decide(name, source) == MessageDisposition::PassThrough {
            debug!(name, ?source, role = ?self.role, "message passed through");
            return MessageDisposition::PassThrough;
        }
        let Some(handler) = self.handler.upgrade() else {
            debug!(name, "no protocol handler, passing through");
            return MessageDisposition::PassThrough;
        };
        let decoded = match Message::decode(message) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(name, ?source, error = %e, "malformed message passed through");
                return MessageDisposition::PassThrough;
            }
        };
        debug!(name, browser = %browser.identifier(), "dispatching");
        dispatch(handler.as_ref(), browser, decoded)
    }
}

fn dispatch(
    handler: &dyn ProtocolHandler,
    browser: &Browser,
    message: Message,
) -> MessageDisposition {
    match message {
        Message::ContextCreated { frame_id } => {
            let Some(frame) = context_frame(browser, frame_id) else {
                return MessageDisposition::PassThrough;
            };
            handler.on_context_created(browser, &frame);
        }
        Message::ContextReleased { frame_id } => {
            let Some(frame) = context_frame(browser, frame_id) else {
                return MessageDisposition::PassThrough;
            };
            handler.on_context_released(browser, &frame);
        }
        Message::UncaughtException {
            frame_id,
            exception,
        } => {
            ExceptionCapture::replay(browser, frame_id, &exception, |frame, exception| {
                handler.on_uncaught_exception(browser, frame, exception)
            });
        }
        Message::EvaluateRequest(request) => handler.on_evaluate_request(browser, request),
        Message::EvaluateResponse(reply) => handler.on_evaluate_response(browser, reply),
        Message::MethodCallRequest(call) => handler.on_method_call_request(browser, call),
        Message::MethodCallResponse(reply) => handler.on_method_call_response(browser, reply),
        Message::CallbackInvokeRequest(invoke) => {
            handler.on_callback_invoke_request(browser, invoke)
        }
        Message::CallbackInvokeResponse(reply) => {
            handler.on_callback_invoke_response(browser, reply)
        }
        Message::CallbackDestroyRequest { callback_id } => {
            handler.on_callback_destroy_request(browser, callback_id)
        }
        Message::ObjectsBound(objects) => handler.on_objects_bound(browser, objects),
        Message::FocusedNodeChanged(node) => handler.on_focused_node_changed(browser, node),
    }
    MessageDisposition::Consume
}

/// The frame a context notification refers to. Only main-frame contexts
/// are announced, so an id unknown here still names the main frame.
fn context_frame(browser: &Browser, frame_id: FrameId) -> Option<Frame> {
    let frame = browser.frame(frame_id).or_else(|| browser.main_frame());
    if frame.is_none() {
        debug!(
            browser = %browser.identifier(),
            frame = %frame_id,
            "no frame for context notification"
        );
    }
    frame
}
