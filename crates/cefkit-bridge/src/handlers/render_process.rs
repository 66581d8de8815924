use std::sync::LazyLock;

use cefkit_common::{ExceptionRecord, ProcessMessage, ProcessRole, StackFrame};

use crate::bridge::{BoundHandler, Bridged, CallbackTable, ObjectBridge};
use crate::handle::{NativeHandle, ObjectKind};
use crate::registry::HandleRegistry;
use crate::wrappers::{Browser, DomNode, Frame, V8Context};

use super::MessageDisposition;

/// Events in a script-executor process.
pub trait RenderProcessHandler: Send + Sync {
    /// A JS context was created for `frame`.
    fn on_context_created(&self, _browser: &Browser, _frame: &Frame, _context: &V8Context) {}

    /// The JS context of `frame` is going away. No script may run in it
    /// after this returns.
    fn on_context_released(&self, _browser: &Browser, _frame: &Frame, _context: &V8Context) {}

    /// Script threw and nothing caught it. Only fires when the engine is
    /// configured with a non-zero uncaught exception stack size.
    fn on_uncaught_exception(
        &self,
        _browser: &Browser,
        _frame: &Frame,
        _context: &V8Context,
        _exception: &ExceptionRecord,
        _stack: &[StackFrame],
    ) {
    }

    /// Focus moved. `node` is `None` when nothing editable has focus.
    fn on_focused_node_changed(
        &self,
        _browser: &Browser,
        _frame: Option<&Frame>,
        _node: Option<&DomNode>,
    ) {
    }

    fn on_process_message_received(
        &self,
        _browser: &Browser,
        _source: ProcessRole,
        _message: &ProcessMessage,
    ) -> MessageDisposition {
        MessageDisposition::PassThrough
    }
}

#[derive(Clone, Copy)]
pub struct RenderProcessTable {
    pub back_ref: NativeHandle,
    pub on_context_created: fn(NativeHandle, NativeHandle, NativeHandle, NativeHandle),
    pub on_context_released: fn(NativeHandle, NativeHandle, NativeHandle, NativeHandle),
    pub on_uncaught_exception: fn(
        NativeHandle,
        NativeHandle,
        NativeHandle,
        NativeHandle,
        &ExceptionRecord,
        &[StackFrame],
    ),
    pub on_focused_node_changed: fn(NativeHandle, NativeHandle, NativeHandle, NativeHandle),
    pub on_process_message_received:
        fn(NativeHandle, NativeHandle, ProcessRole, &ProcessMessage) -> i32,
}

static RENDER_PROCESS_HANDLERS: LazyLock<HandleRegistry<BoundHandler<dyn RenderProcessHandler>>> =
    LazyLock::new(HandleRegistry::new);

impl Bridged for dyn RenderProcessHandler {
    const KIND: ObjectKind = ObjectKind::RenderProcessHandler;

    fn registry() -> &'static HandleRegistry<BoundHandler<Self>> {
        &RENDER_PROCESS_HANDLERS
    }

    fn callback_table(back_ref: NativeHandle) -> CallbackTable {
        CallbackTable::RenderProcess(RenderProcessTable {
            back_ref,
            on_context_created,
            on_context_released,
            on_uncaught_exception,
            on_focused_node_changed,
            on_process_message_received,
        })
    }
}

type ContextArgs = (Browser, Frame, V8Context);

/// Wrap the (browser, frame, context) triple most slots receive.
fn context_args(
    bound: &BoundHandler<dyn RenderProcessHandler>,
    browser: NativeHandle,
    frame: NativeHandle,
    context: NativeHandle,
) -> Option<ContextArgs> {
    let engine = bound.engine();
    Some((
        Browser::from_borrowed(engine, browser)?,
        Frame::from_borrowed(engine, frame)?,
        V8Context::from_borrowed(engine, context)?,
    ))
}

fn on_context_created(
    this: NativeHandle,
    browser: NativeHandle,
    frame: NativeHandle,
    context: NativeHandle,
) {
    let Some(bound) = ObjectBridge::resolve::<dyn RenderProcessHandler>(this) else {
        return;
    };
    if let Some((browser, frame, context)) = context_args(&bound, browser, frame, context) {
        bound.handler().on_context_created(&browser, &frame, &context);
    }
}

fn on_context_released(
    this: NativeHandle,
    browser: NativeHandle,
    frame: NativeHandle,
    context: NativeHandle,
) {
    let Some(bound) = ObjectBridge::resolve::<dyn RenderProcessHandler>(this) else {
        return;
    };
    if let Some((browser, frame, context)) = context_args(&bound, browser, frame, context) {
        bound.handler().on_context_released(&browser, &frame, &context);
    }
}

fn on_uncaught_exception(
    this: NativeHandle,
    browser: NativeHandle,
    frame: NativeHandle,
    context: NativeHandle,
    exception: &ExceptionRecord,
    stack: &[StackFrame],
) {
    let Some(bound) = ObjectBridge::resolve::<dyn RenderProcessHandler>(this) else {
        return;
    };
    if let Some((browser, frame, context)) = context_args(&bound, browser, frame, context) {
        bound
            .handler()
            .on_uncaught_exception(&browser, &frame, &context, exception, stack);
    }
}

fn on_focused_node_changed(
    this: NativeHandle,
    browser: NativeHandle,
    frame: NativeHandle,
    node: NativeHandle,
) {
    let Some(bound) = ObjectBridge::resolve::<dyn RenderProcessHandler>(this) else {
        return;
    };
    let engine = bound.engine();
    let Some(browser) = Browser::from_borrowed(engine, browser) else {
        return;
    };
    let frame = Frame::from_borrowed(engine, frame);
    let node = DomNode::from_borrowed(engine, node);
    bound
        .handler()
        .on_focused_node_changed(&browser, frame.as_ref(), node.as_ref());
}

fn on_process_message_received(
    this: NativeHandle,
    browser: NativeHandle,
    source: ProcessRole,
    message: &ProcessMessage,
) -> i32 {
    let Some(bound) = ObjectBridge::resolve::<dyn RenderProcessHandler>(this) else {
        return 0;
    };
    let Some(browser) = Browser::from_borrowed(bound.engine(), browser) else {
        return 0;
    };
    bound
        .handler()
        .on_process_message_received(&browser, source, message)
        .to_native()
}
