//! The controller side of the protocol.

use std::sync::{Arc, Weak};
use std::time::Duration;

use cefkit_bridge::{
    Bound, Browser, Client, ClientHandlers, ContextMenuHandler, DisplayHandler, Frame,
    MessageDisposition, RenderHandler,
};
use cefkit_common::{ExceptionRecord, FrameId, ListValue, ProcessMessage, ProcessRole, Value};
use cefkit_config::CefkitConfig;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::codec::{
    BoundObject, CallbackInvoke, CallbackReply, EvaluateRequest, FocusedNode, Message, MethodCall,
    Reply,
};
use crate::errors::CallError;
use crate::events::{EventBus, ProtocolEvent};
use crate::objects::ObjectRepository;
use crate::pending::{PendingRequest, PendingRequests};
use crate::router::{MessageRouter, ProtocolHandler, RouterOptions};

const EVENT_CAPACITY: usize = 256;

/// Outcome of a correlated request: the peer's value or its error text.
type Outcome = Result<Value, String>;

/// Runs in the controller process as each browser's [`Client`].
///
/// Forwards inbound process messages to its [`MessageRouter`], resolves
/// requests it sent to script executors, answers method calls on objects
/// registered in [`objects`](Self::objects) and republishes notifications
/// on an [`EventBus`].
pub struct ControllerEndpoint {
    router: MessageRouter,
    handlers: ClientHandlers,
    pending: PendingRequests<Outcome>,
    objects: ObjectRepository,
    events: EventBus,
    timeout: Duration,
}

impl ControllerEndpoint {
    pub fn new(config: &CefkitConfig) -> Arc<Self> {
        Self::with_handlers(config, ClientHandlers::default())
    }

    /// An endpoint that also serves `handlers` to the engine.
    pub fn with_handlers(config: &CefkitConfig, handlers: ClientHandlers) -> Arc<Self> {
        let options = RouterOptions::from_config(config);
        Arc::new_cyclic(|me: &Weak<Self>| {
            let handler: Weak<dyn ProtocolHandler> = me.clone();
            Self {
                router: MessageRouter::new(ProcessRole::Controller, options, handler),
                handlers,
                pending: PendingRequests::new(config.protocol.pending_request_capacity as usize),
                objects: ObjectRepository::new(),
                events: EventBus::new(EVENT_CAPACITY),
                timeout: Duration::from_millis(config.protocol.evaluate_timeout_ms),
            }
        })
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    /// Objects script executors may call methods on.
    pub fn objects(&self) -> &ObjectRepository {
        &self.objects
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProtocolEvent> {
        self.events.subscribe()
    }

    /// Requests sent and not yet answered.
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    /// Evaluate `script` in `frame` of `browser` and wait for the result.
    pub async fn evaluate(
        &self,
        browser: &Browser,
        frame: FrameId,
        script: &str,
    ) -> Result<Value, CallError> {
        let request = self.pending.register()?;
        self.send_evaluate(browser, request, frame, script).await
    }

    /// Like [`evaluate`](Self::evaluate) with a caller-chosen correlation id.
    pub async fn evaluate_with_id(
        &self,
        browser: &Browser,
        id: i64,
        frame: FrameId,
        script: &str,
    ) -> Result<Value, CallError> {
        let request = self.pending.register_with_id(id)?;
        self.send_evaluate(browser, request, frame, script).await
    }

    async fn send_evaluate(
        &self,
        browser: &Browser,
        request: PendingRequest<Outcome>,
        frame: FrameId,
        script: &str,
    ) -> Result<Value, CallError> {
        let message = Message::EvaluateRequest(EvaluateRequest {
            id: request.id(),
            frame_id: frame,
            script: script.to_owned(),
        });
        debug!(id = request.id(), %frame, "evaluate");
        request
            .send_and_wait(browser, ProcessRole::ScriptExecutor, &message, self.timeout)
            .await
    }

    /// Call `method` on an object the script executor registered.
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
            .send_and_wait(browser, ProcessRole::ScriptExecutor, &message, self.timeout)
            .await
    }

    /// Invoke a script function the script executor handed out as a callback.
    pub async fn invoke_callback(
        &self,
        browser: &Browser,
        callback_id: i64,
        args: ListValue,
    ) -> Result<Value, CallError> {
        let request = self.pending.register()?;
        let message = Message::CallbackInvokeRequest(CallbackInvoke {
            callback_id,
            id: request.id(),
            args,
        });
        request
            .send_and_wait(browser, ProcessRole::ScriptExecutor, &message, self.timeout)
            .await
    }

    /// Tell the script executor `callback_id` will not be invoked again.
    pub fn destroy_callback(&self, browser: &Browser, callback_id: i64) -> bool {
        Message::CallbackDestroyRequest { callback_id }.send(browser, ProcessRole::ScriptExecutor)
    }

    fn publish(&self, event: ProtocolEvent) {
        let receivers = self.events.publish(event);
        if receivers == 0 {
            debug!("protocol event had no subscribers");
        }
    }

    fn resolve(&self, kind: &str, reply: Reply) {
        if !self.pending.resolve(reply.id, reply.result) {
            debug!(id = reply.id, kind, "late or unknown response ignored");
        }
    }
}

impl Client for ControllerEndpoint {
    fn context_menu_handler(&self) -> Option<Bound<dyn ContextMenuHandler>> {
        self.handlers.context_menu_handler()
    }

    fn display_handler(&self) -> Option<Bound<dyn DisplayHandler>> {
        self.handlers.display_handler()
    }

    fn render_handler(&self) -> Option<Bound<dyn RenderHandler>> {
        self.handlers.render_handler()
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

impl ProtocolHandler for ControllerEndpoint {
    fn on_context_created(&self, browser: &Browser, frame: &Frame) {
        info!(browser = %browser.identifier(), frame = %frame.identifier(), "context created");
        self.publish(ProtocolEvent::ContextCreated {
            browser: browser.identifier(),
            frame: frame.identifier(),
        });
    }

    fn on_context_released(&self, browser: &Browser, frame: &Frame) {
        debug!(browser = %browser.identifier(), frame = %frame.identifier(), "context released");
        self.publish(ProtocolEvent::ContextReleased {
            browser: browser.identifier(),
            frame: frame.identifier(),
        });
    }

    fn on_uncaught_exception(
        &self,
        browser: &Browser,
        frame: &Frame,
        exception: &ExceptionRecord,
    ) {
        warn!(
            browser = %browser.identifier(),
            frame = %frame.identifier(),
            line = exception.line_number,
            "uncaught exception: {}",
            exception.message
        );
        self.publish(ProtocolEvent::UncaughtException {
            browser: browser.identifier(),
            frame: frame.identifier(),
            exception: exception.clone(),
        });
    }

    fn on_evaluate_request(&self, browser: &Browser, request: EvaluateRequest) {
        let reply = Reply {
            id: request.id,
            result: Err("the controller does not evaluate script".into()),
        };
        Message::EvaluateResponse(reply).send(browser, ProcessRole::ScriptExecutor);
    }

    fn on_evaluate_response(&self, _browser: &Browser, reply: Reply) {
        self.resolve("evaluate", reply);
    }

    fn on_method_call_request(&self, browser: &Browser, call: MethodCall) {
        let reply = self.objects.answer(&call);
        Message::MethodCallResponse(reply).send(browser, ProcessRole::ScriptExecutor);
    }

    fn on_method_call_response(&self, _browser: &Browser, reply: Reply) {
        self.resolve("method-call", reply);
    }

    fn on_callback_invoke_request(&self, browser: &Browser, invoke: CallbackInvoke) {
        let reply = CallbackReply {
            callback_id: invoke.callback_id,
            reply: Reply {
                id: invoke.id,
                result: Err(format!("callback {} does not exist", invoke.callback_id)),
            },
        };
        Message::CallbackInvokeResponse(reply).send(browser, ProcessRole::ScriptExecutor);
    }

    fn on_callback_invoke_response(&self, _browser: &Browser, reply: CallbackReply) {
        self.resolve("callback", reply.reply);
    }

    fn on_objects_bound(&self, browser: &Browser, objects: Vec<BoundObject>) {
        self.objects.mark_bound(&objects);
        self.publish(ProtocolEvent::ObjectsBound {
            browser: browser.identifier(),
            names: objects.into_iter().map(|o| o.name).collect(),
        });
    }

    fn on_focused_node_changed(&self, browser: &Browser, node: Option<FocusedNode>) {
        self.publish(ProtocolEvent::FocusedNodeChanged {
            browser: browser.identifier(),
            node,
        });
    }
}
