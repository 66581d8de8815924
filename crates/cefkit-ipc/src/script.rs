//! The script-executor side of the protocol.

use std::sync::{Arc, Weak};
use std::time::Duration;

use cefkit_bridge::{Browser, DomNode, Frame, MessageDisposition, RenderProcessHandler, V8Context};
use cefkit_common::{ExceptionRecord, ListValue, ProcessMessage, ProcessRole, StackFrame, Value};
use cefkit_config::CefkitConfig;
use tracing::{debug, trace};

use crate::callbacks::ScriptCallbacks;
use crate::codec::{
    CallbackInvoke, CallbackReply, EvaluateRequest, FocusedNode, Message, MethodCall, Reply,
};
use crate::errors::CallError;
use crate::exception::ExceptionCapture;
use crate::frames::FrameTracker;
use crate::objects::ObjectRepository;
use crate::pending::PendingRequests;
use crate::router::{MessageRouter, ProtocolHandler, RouterOptions};

/// Runs in each script-executor process as its [`RenderProcessHandler`].
///
/// Announces context lifetimes and bound objects to the controller,
/// reports uncaught exceptions, evaluates script on request and runs
/// callbacks and object methods the controller invokes.
pub struct ScriptEndpoint {
    router: MessageRouter,
    frames: FrameTracker,
    callbacks: ScriptCallbacks,
    objects: ObjectRepository,
    pending: PendingRequests<Result<Value, String>>,
    report_exceptions: bool,
    timeout: Duration,
}

impl ScriptEndpoint {
    pub fn new(config: &CefkitConfig) -> Arc<Self> {
        let options = RouterOptions::from_config(config);
        Arc::new_cyclic(|me: &Weak<Self>| {
            let handler: Weak<dyn ProtocolHandler> = me.clone();
            Self {
                router: MessageRouter::new(ProcessRole::ScriptExecutor, options, handler),
                frames: FrameTracker::new(),
                callbacks: ScriptCallbacks::new(),
                objects: ObjectRepository::new(),
                pending: PendingRequests::new(config.protocol.pending_request_capacity as usize),
                report_exceptions: config.process.uncaught_exception_stack_size > 0,
                timeout: Duration::from_millis(config.protocol.evaluate_timeout_ms),
            }
        })
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    pub fn frames(&self) -> &FrameTracker {
        &self.frames
    }

    pub fn callbacks(&self) -> &ScriptCallbacks {
        &self.callbacks
    }

    /// Objects announced to the controller whenever a context is created.
    pub fn objects(&self) -> &ObjectRepository {
        &self.objects
    }

    /// Call `method` on an object registered with the controller.
    pub async fn call_method(
        &self,
        browser: &Browser,
        object_id: i64,
        method: &str,
        args: ListValue,
    ) -> Result<Value, CallError> {
        let request = self.pending.register()?;
        let message = Message::MethodCallRequest(MethodCall {
            id: request.id(),
            object_id,
            method: method.to_owned(),
            args,
        });
        request
            .send_and_wait(browser, ProcessRole::Controller, &message, self.timeout)
            .await
    }

    fn evaluate(&self, browser: &Browser, request: &EvaluateRequest) -> Result<Value, String> {
        let frame_id = request.frame_id;
        if !self.frames.has_context(browser.identifier(), frame_id) {
            return Err(format!("frame {frame_id} has no script context"));
        }
        let frame = browser
            .frame(frame_id)
            .ok_or_else(|| format!("frame {frame_id} does not exist"))?;
        let context = frame
            .v8_context()
            .ok_or_else(|| format!("frame {frame_id} has no script context"))?;

        if !context.enter() {
            return Err("could not enter script context".into());
        }
        let result = context.eval(&request.script, None, 1);
        context.exit();
        result.map_err(|e| e.message)
    }
}

impl RenderProcessHandler for ScriptEndpoint {
    fn on_context_created(&self, browser: &Browser, frame: &Frame, _context: &V8Context) {
        let frame_id = frame.identifier();
        self.frames.context_created(browser.identifier(), frame_id);
        // Subframe contexts stay local; the controller only follows the main frame.
        if !frame.is_main() {
            return;
        }
        Message::ContextCreated { frame_id }.send(browser, ProcessRole::Controller);

        let objects = self.objects.descriptors();
        if !objects.is_empty() {
            Message::ObjectsBound(objects).send(browser, ProcessRole::Controller);
        }
    }

    fn on_context_released(&self, browser: &Browser, frame: &Frame, _context: &V8Context) {
        let frame_id = frame.identifier();
        self.frames.context_released(browser.identifier(), frame_id);
        if frame.is_main() {
            Message::ContextReleased { frame_id }.send(browser, ProcessRole::Controller);
        }
    }

    fn on_uncaught_exception(
        &self,
        browser: &Browser,
        frame: &Frame,
        _context: &V8Context,
        exception: &ExceptionRecord,
        stack: &[StackFrame],
    ) {
        if !self.report_exceptions {
            return;
        }
        trace!(frames = stack.len(), "uncaught exception stack");
        ExceptionCapture::report(browser, frame, exception);
    }

    fn on_focused_node_changed(
        &self,
        browser: &Browser,
        _frame: Option<&Frame>,
        node: Option<&DomNode>,
    ) {
        if !self.router.options().focused_node_notifications {
            return;
        }
        let node = node.map(|node| FocusedNode {
            tag_name: node.tag_name(),
            editable: node.is_editable(),
        });
        Message::FocusedNodeChanged(node).send(browser, ProcessRole::Controller);
    }

    fn on_process_message_received(
        &self,
        browser: &Browser,
        source: ProcessRole,
        message: &ProcessMessage,
    ) -> MessageDisposition {
        self.router.route(browser, source, message)
    }
}

impl ProtocolHandler for ScriptEndpoint {
    fn on_evaluate_request(&self, browser: &Browser, request: EvaluateRequest) {
        let result = self.evaluate(browser, &request);
        debug!(id = request.id, ok = result.is_ok(), "evaluated");
        let reply = Reply {
            id: request.id,
            result,
        };
        Message::EvaluateResponse(reply).send(browser, ProcessRole::Controller);
    }

    fn on_method_call_request(&self, browser: &Browser, call: MethodCall) {
        let reply = self.objects.answer(&call);
        Message::MethodCallResponse(reply).send(browser, ProcessRole::Controller);
    }

    fn on_method_call_response(&self, _browser: &Browser, reply: Reply) {
        if !self.pending.resolve(reply.id, reply.result) {
            debug!(id = reply.id, "late or unknown method-call response ignored");
        }
    }

    fn on_callback_invoke_request(&self, browser: &Browser, invoke: CallbackInvoke) {
        let result = self.callbacks.invoke(invoke.callback_id, &invoke.args);
        let reply = CallbackReply {
            callback_id: invoke.callback_id,
            reply: Reply {
                id: invoke.id,
                result,
            },
        };
        Message::CallbackInvokeResponse(reply).send(browser, ProcessRole::Controller);
    }

    fn on_callback_destroy_request(&self, _browser: &Browser, callback_id: i64) {
        if !self.callbacks.destroy(callback_id) {
            debug!(callback_id, "destroy of unknown callback");
        }
    }
}
