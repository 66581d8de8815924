//! Controller and script executor wired back to back over two in-memory
//! engines.

use std::sync::{Arc, Weak};

use cefkit_bridge::mock::InMemoryEngine;
use cefkit_bridge::{
    App, AppHandlers, Bound, Browser, Client, DomNode, MessageDisposition, NativeEngine,
    NativeHandle, ObjectBridge, RenderProcessHandler,
};
use cefkit_common::{BrowserId, ExceptionRecord, FrameId, ListValue, ProcessRole, Value};
use cefkit_config::CefkitConfig;
use tokio::sync::broadcast::error::TryRecvError;

use crate::{CallError, ControllerEndpoint, FocusedNode, Message, ProtocolEvent, ScriptEndpoint};

struct Harness {
    controller_engine: Arc<InMemoryEngine>,
    script_engine: Arc<InMemoryEngine>,
    controller: Arc<ControllerEndpoint>,
    script: Arc<ScriptEndpoint>,
    /// Controller-side view of browser 1.
    browser: Browser,
    /// Script-side view of browser 1.
    script_browser: Browser,
    _client: Bound<dyn Client>,
    _app: Bound<dyn App>,
}

fn connect(from: &InMemoryEngine, to: &Arc<InMemoryEngine>) {
    let to: Weak<InMemoryEngine> = Arc::downgrade(to);
    from.set_transport(move |out| {
        if let Some(peer) = to.upgrade() {
            peer.deliver(out.browser_id.0, out.source, &out.message);
        }
    });
}

fn harness(config: &CefkitConfig) -> Harness {
    let controller_engine = Arc::new(InMemoryEngine::new(ProcessRole::Controller));
    let script_engine = Arc::new(InMemoryEngine::new(ProcessRole::ScriptExecutor));
    let c_engine: Arc<dyn NativeEngine> = controller_engine.clone();
    let s_engine: Arc<dyn NativeEngine> = script_engine.clone();

    let controller = ControllerEndpoint::new(config);
    let client = ObjectBridge::install::<dyn Client>(&c_engine, controller.clone()).unwrap();
    let browser = controller_engine.create_browser(1, 10, client.handle());
    let browser = Browser::from_native(&c_engine, browser).unwrap();

    let script = ScriptEndpoint::new(config);
    let rph =
        ObjectBridge::install::<dyn RenderProcessHandler>(&s_engine, script.clone()).unwrap();
    let app = ObjectBridge::install::<dyn App>(
        &s_engine,
        Arc::new(AppHandlers {
            browser_process: None,
            render_process: Some(rph),
        }),
    )
    .unwrap();
    script_engine.set_app(app.handle());
    let script_browser = script_engine.create_browser(1, 10, NativeHandle::NULL);
    let script_browser = Browser::from_native(&s_engine, script_browser).unwrap();

    script_engine.set_evaluator(|code| match code {
        "1+1" => Ok(Value::Int(2)),
        _ => {
            let mut e = ExceptionRecord::new("x is not defined");
            e.line_number = 1;
            Err(e)
        }
    });
    connect(&controller_engine, &script_engine);
    connect(&script_engine, &controller_engine);

    Harness {
        controller_engine,
        script_engine,
        controller,
        script,
        browser,
        script_browser,
        _client: client,
        _app: app,
    }
}

fn next_event(rx: &mut tokio::sync::broadcast::Receiver<ProtocolEvent>) -> Option<ProtocolEvent> {
    match rx.try_recv() {
        Ok(event) => Some(event),
        Err(TryRecvError::Empty) => None,
        Err(e) => panic!("event stream broken: {e}"),
    }
}

#[tokio::test]
async fn evaluate_round_trip_with_fixed_id() {
    let h = harness(&CefkitConfig::default());
    assert!(h.script_engine.fire_context_created(1, 10));

    let value = h
        .controller
        .evaluate_with_id(&h.browser, 42, FrameId(10), "1+1")
        .await
        .unwrap();
    assert_eq!(value, Value::Int(2));
    assert_eq!(h.controller.outstanding(), 0);
}

#[tokio::test]
async fn evaluate_reports_script_errors() {
    let h = harness(&CefkitConfig::default());
    h.script_engine.fire_context_created(1, 10);

    let err = h
        .controller
        .evaluate(&h.browser, FrameId(10), "x")
        .await
        .unwrap_err();
    assert_eq!(err, CallError::Remote("x is not defined".into()));
}

#[tokio::test]
async fn evaluate_without_context_fails() {
    let h = harness(&CefkitConfig::default());

    let err = h
        .controller
        .evaluate(&h.browser, FrameId(10), "1+1")
        .await
        .unwrap_err();
    assert_eq!(err, CallError::Remote("frame 10 has no script context".into()));

    h.script_engine.fire_context_created(1, 10);
    h.script_engine.fire_context_released(1, 10);
    let err = h
        .controller
        .evaluate(&h.browser, FrameId(10), "1+1")
        .await
        .unwrap_err();
    assert_eq!(err, CallError::Remote("frame 10 has no script context".into()));
}

#[tokio::test]
async fn unanswered_request_times_out() {
    let mut config = CefkitConfig::default();
    config.protocol.evaluate_timeout_ms = 30;
    let h = harness(&config);
    h.controller_engine.set_transport(|_| {});

    let err = h
        .controller
        .evaluate(&h.browser, FrameId(10), "1+1")
        .await
        .unwrap_err();
    assert!(matches!(err, CallError::Request(crate::RequestError::Timeout { .. })));
    assert_eq!(h.controller.outstanding(), 0);
}

#[test]
fn context_lifetime_is_announced() {
    let h = harness(&CefkitConfig::default());
    let mut events = h.controller.subscribe();

    h.script_engine.fire_context_created(1, 10);
    h.script_engine.fire_context_released(1, 10);

    match next_event(&mut events) {
        Some(ProtocolEvent::ContextCreated { browser, frame }) => {
            assert_eq!((browser, frame), (BrowserId(1), FrameId(10)));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        next_event(&mut events),
        Some(ProtocolEvent::ContextReleased { .. })
    ));
    assert!(next_event(&mut events).is_none());
    assert!(!h.script.frames().has_context(BrowserId(1), FrameId(10)));
}

#[tokio::test]
async fn subframe_contexts_are_not_announced() {
    let h = harness(&CefkitConfig::default());
    let mut events = h.controller.subscribe();
    assert!(h.script_engine.add_frame(1, 20));
    h.script_engine.fire_context_created(1, 10);
    assert!(matches!(
        next_event(&mut events),
        Some(ProtocolEvent::ContextCreated { frame: FrameId(10), .. })
    ));

    h.script_engine.fire_context_created(1, 20);
    assert!(next_event(&mut events).is_none());
    assert!(h.script.frames().has_context(BrowserId(1), FrameId(20)));

    let value = h
        .controller
        .evaluate(&h.browser, FrameId(20), "1+1")
        .await
        .unwrap();
    assert_eq!(value, Value::Int(2));

    h.script_engine.fire_context_released(1, 20);
    assert!(next_event(&mut events).is_none());
    assert!(!h.script.frames().has_context(BrowserId(1), FrameId(20)));
    assert!(h.script.frames().has_context(BrowserId(1), FrameId(10)));
}

#[test]
fn uncaught_exception_arrives_intact() {
    let h = harness(&CefkitConfig::default());
    let mut events = h.controller.subscribe();
    let exception = ExceptionRecord {
        message: "x is not defined".into(),
        line_number: 12,
        start_position: 100,
        end_position: 105,
        start_column: 3,
        end_column: 8,
    };

    assert!(h.script_engine.fire_uncaught_exception(1, 10, &exception, &[]));

    match next_event(&mut events) {
        Some(ProtocolEvent::UncaughtException {
            browser,
            frame,
            exception: received,
        }) => {
            assert_eq!(browser, BrowserId(1));
            assert_eq!(frame, FrameId(10));
            assert_eq!(received, exception);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn exception_for_frame_unknown_to_controller_is_dropped() {
    let h = harness(&CefkitConfig::default());
    let mut events = h.controller.subscribe();
    assert!(h.script_engine.add_frame(1, 11));

    h.script_engine
        .fire_uncaught_exception(1, 11, &ExceptionRecord::new("boom"), &[]);

    assert!(next_event(&mut events).is_none());
}

#[test]
fn exceptions_stay_local_when_stack_size_is_zero() {
    let mut config = CefkitConfig::default();
    config.process.uncaught_exception_stack_size = 0;
    let h = harness(&config);
    let mut events = h.controller.subscribe();

    h.script_engine
        .fire_uncaught_exception(1, 10, &ExceptionRecord::new("boom"), &[]);

    assert!(next_event(&mut events).is_none());
}

#[test]
fn single_process_passes_everything_through() {
    let mut config = CefkitConfig::default();
    config.process.single_process = true;
    let h = harness(&config);
    let mut events = h.controller.subscribe();

    h.script_engine.fire_context_created(1, 10);
    assert!(next_event(&mut events).is_none());

    let message = Message::ContextCreated {
        frame_id: FrameId(10),
    }
    .encode();
    assert_eq!(
        h.controller_engine
            .deliver(1, ProcessRole::ScriptExecutor, &message),
        MessageDisposition::PassThrough
    );
}

fn focus_input(h: &Harness) {
    let engine: Arc<dyn NativeEngine> = h.script_engine.clone();
    let node = DomNode::from_native(&engine, h.script_engine.create_dom_node("input", true))
        .unwrap();
    h.script_engine
        .fire_focused_node_changed(1, Some(10), node.handle());
}

#[test]
fn focused_node_is_forwarded_only_when_enabled() {
    let h = harness(&CefkitConfig::default());
    let mut events = h.controller.subscribe();
    focus_input(&h);
    assert!(next_event(&mut events).is_none());

    let mut config = CefkitConfig::default();
    config.protocol.focused_node_notifications = true;
    let h = harness(&config);
    let mut events = h.controller.subscribe();
    focus_input(&h);
    h.script_engine
        .fire_focused_node_changed(1, None, NativeHandle::NULL);

    let expected = FocusedNode {
        tag_name: "INPUT".into(),
        editable: true,
    };
    match next_event(&mut events) {
        Some(ProtocolEvent::FocusedNodeChanged { node, .. }) => {
            assert_eq!(node, Some(expected));
        }
        other => panic!("unexpected {other:?}"),
    }
    match next_event(&mut events) {
        Some(ProtocolEvent::FocusedNodeChanged { node, .. }) => assert_eq!(node, None),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn destroyed_callback_cannot_be_invoked() {
    let h = harness(&CefkitConfig::default());
    let id = h
        .script
        .callbacks()
        .register(|args| Ok(args.get(0).cloned().unwrap_or(Value::Null)));

    let mut args = ListValue::new();
    args.push(7i64);
    let value = h
        .controller
        .invoke_callback(&h.browser, id, args.clone())
        .await
        .unwrap();
    assert_eq!(value, Value::Int(7));

    assert!(h.controller.destroy_callback(&h.browser, id));
    assert!(!h.script.callbacks().contains(id));

    let err = h
        .controller
        .invoke_callback(&h.browser, id, args)
        .await
        .unwrap_err();
    assert_eq!(err, CallError::Remote(format!("callback {id} does not exist")));
}

#[tokio::test]
async fn script_calls_controller_methods() {
    let h = harness(&CefkitConfig::default());
    let objects = h.controller.objects();
    let math = objects.register_object("math");
    assert!(objects.register_method(math, "add", |args| {
        let a = args.int(0).ok_or("first argument must be an integer")?;
        let b = args.int(1).ok_or("second argument must be an integer")?;
        Ok(Value::Int(a + b))
    }));

    let mut args = ListValue::new();
    args.push(2i64);
    args.push(3i64);
    let sum = h
        .script
        .call_method(&h.script_browser, math, "add", args)
        .await
        .unwrap();
    assert_eq!(sum, Value::Int(5));

    let err = h
        .script
        .call_method(&h.script_browser, math, "sub", ListValue::new())
        .await
        .unwrap_err();
    assert_eq!(err, CallError::Remote("math has no method sub".into()));
}

#[test]
fn bound_objects_are_announced_with_context() {
    let h = harness(&CefkitConfig::default());
    let mut events = h.controller.subscribe();
    h.script.objects().register_object("bridge");

    h.script_engine.fire_context_created(1, 10);

    assert!(matches!(
        next_event(&mut events),
        Some(ProtocolEvent::ContextCreated { .. })
    ));
    match next_event(&mut events) {
        Some(ProtocolEvent::ObjectsBound { names, .. }) => assert_eq!(names, vec!["bridge"]),
        other => panic!("unexpected {other:?}"),
    }
    assert!(h.controller.objects().is_bound("bridge"));
}

#[test]
fn teardown_balances_references() {
    let h = harness(&CefkitConfig::default());
    h.script_engine.fire_context_created(1, 10);
    let controller_engine = Arc::clone(&h.controller_engine);
    let script_engine = Arc::clone(&h.script_engine);

    controller_engine.close_browser(1);
    script_engine.close_browser(1);
    script_engine.set_app(NativeHandle::NULL);
    drop(h);

    assert_eq!(controller_engine.over_releases(), 0);
    assert_eq!(script_engine.over_releases(), 0);
    assert_eq!(controller_engine.live_objects(), 0);
    assert_eq!(script_engine.live_objects(), 0);
}
