//! Deterministic in-memory engine for tests and the sample app.
//!
//! Counts every retain and release, keeps the object graph a real engine
//! would (browsers own their client and frames, frames own their JS
//! context, menus own their delegate) and lets a test fire callback slots
//! the way the native side would. Callbacks never run under the state
//! lock, so handlers may call back into the engine.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cefkit_common::{BrowserId, ExceptionRecord, ProcessMessage, ProcessRole, StackFrame, Value};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace, warn};

use crate::bridge::CallbackTable;
use crate::engine::NativeEngine;
use crate::handle::{NativeHandle, ObjectKind};
use crate::handlers::{AppTable, MessageDisposition, RenderProcessTable};

/// Addresses are unique across every engine in the process, so proxies
/// from two engines never collide in the shared registries.
static NEXT_ADDR: AtomicUsize = AtomicUsize::new(0x1000);

fn next_handle() -> NativeHandle {
    NativeHandle::from_addr(NEXT_ADDR.fetch_add(0x10, Ordering::Relaxed))
}

pub type Evaluator = Arc<dyn Fn(&str) -> Result<Value, ExceptionRecord> + Send + Sync>;
pub type Transport = Arc<dyn Fn(OutgoingMessage) + Send + Sync>;

/// A process message leaving this engine.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub browser_id: BrowserId,
    pub source: ProcessRole,
    pub target: ProcessRole,
    pub message: ProcessMessage,
}

enum MenuItem {
    Command { id: i32, label: String },
    Separator,
}

enum Data {
    Handler,
    Browser {
        id: i32,
        client: NativeHandle,
        main_frame: NativeHandle,
        frames: Vec<(i64, NativeHandle)>,
    },
    Frame {
        id: i64,
        is_main: bool,
        browser: NativeHandle,
        context: NativeHandle,
    },
    Context {
        browser: NativeHandle,
        frame: NativeHandle,
    },
    MenuModel {
        delegate: NativeHandle,
        items: Vec<MenuItem>,
    },
    DomNode {
        tag_name: String,
        editable: bool,
    },
}

impl Data {
    /// Handles this object holds a reference on.
    fn owned(&self) -> Vec<NativeHandle> {
        match self {
            Data::Browser { client, frames, .. } => {
                let mut owned = vec![*client];
                owned.extend(frames.iter().map(|(_, h)| *h));
                owned
            }
            Data::Frame { context, .. } => vec![*context],
            Data::MenuModel { delegate, .. } => vec![*delegate],
            _ => Vec::new(),
        }
    }
}

struct Object {
    kind: ObjectKind,
    refs: usize,
    /// Torn down by the engine while references are still outstanding.
    detached: bool,
    table: Option<CallbackTable>,
    data: Data,
}

/// (id, client, main frame, frames by id)
type BrowserView<'a> = (i32, NativeHandle, NativeHandle, &'a [(i64, NativeHandle)]);

#[derive(Default)]
struct State {
    objects: HashMap<usize, Object>,
    browsers: HashMap<i32, NativeHandle>,
    app: Option<NativeHandle>,
    entered: Vec<NativeHandle>,
    outbox: Vec<OutgoingMessage>,
    retains: usize,
    releases: usize,
    releases_by_handle: HashMap<usize, usize>,
    over_releases: usize,
}

impl State {
    fn alloc(&mut self, kind: ObjectKind, data: Data) -> NativeHandle {
        let handle = next_handle();
        self.objects.insert(
            handle.addr(),
            Object {
                kind,
                refs: 1,
                detached: false,
                table: None,
                data,
            },
        );
        handle
    }

    fn object(&self, handle: NativeHandle) -> Option<&Object> {
        self.objects.get(&handle.addr())
    }

    fn retain(&mut self, handle: NativeHandle) -> bool {
        match self.objects.get_mut(&handle.addr()) {
            Some(object) => {
                object.refs += 1;
                self.retains += 1;
                true
            }
            None => false,
        }
    }

    /// A +1 reference for returning to a caller, or NULL.
    fn retained(&mut self, handle: NativeHandle) -> NativeHandle {
        if self.retain(handle) {
            handle
        } else {
            NativeHandle::NULL
        }
    }

    fn release(&mut self, handle: NativeHandle) -> bool {
        if handle.is_null() {
            return false;
        }
        let mut pending = vec![handle];
        let mut destroyed_first = false;
        while let Some(h) = pending.pop() {
            if h.is_null() {
                continue;
            }
            let Some(object) = self.objects.get_mut(&h.addr()) else {
                self.over_releases += 1;
                warn!(handle = %h, "release of dead handle");
                continue;
            };
            object.refs -= 1;
            self.releases += 1;
            *self.releases_by_handle.entry(h.addr()).or_default() += 1;
            if object.refs == 0 {
                if let Some(object) = self.objects.remove(&h.addr()) {
                    trace!(handle = %h, kind = %object.kind, "object destroyed");
                    pending.extend(object.data.owned());
                }
                if h == handle {
                    destroyed_first = true;
                }
            }
        }
        destroyed_first
    }

    fn browser_data(&self, handle: NativeHandle) -> Option<BrowserView<'_>> {
        match &self.object(handle)?.data {
            Data::Browser {
                id,
                client,
                main_frame,
                frames,
            } => Some((*id, *client, *main_frame, frames.as_slice())),
            _ => None,
        }
    }

    fn browser_by_id(&self, id: i32) -> NativeHandle {
        self.browsers.get(&id).copied().unwrap_or(NativeHandle::NULL)
    }

    fn frame_in_browser(&self, browser: NativeHandle, frame_id: i64) -> NativeHandle {
        self.browser_data(browser)
            .and_then(|(_, _, _, frames)| frames.iter().find(|(id, _)| *id == frame_id))
            .map_or(NativeHandle::NULL, |(_, h)| *h)
    }

    fn frame_context(&self, frame: NativeHandle) -> NativeHandle {
        match self.object(frame).map(|o| &o.data) {
            Some(Data::Frame { context, .. }) => *context,
            _ => NativeHandle::NULL,
        }
    }
}

/// An engine whose whole object graph lives in a hash map.
pub struct InMemoryEngine {
    role: ProcessRole,
    state: Mutex<State>,
    evaluator: RwLock<Option<Evaluator>>,
    transport: RwLock<Option<Transport>>,
}

impl InMemoryEngine {
    pub fn new(role: ProcessRole) -> Self {
        Self {
            role,
            state: Mutex::new(State::default()),
            evaluator: RwLock::new(None),
            transport: RwLock::new(None),
        }
    }

    pub fn role(&self) -> ProcessRole {
        self.role
    }

    // -- setup ---------------------------------------------------------------

    /// Make `app` this process's application object. The engine keeps its
    /// own reference.
    pub fn set_app(&self, app: NativeHandle) {
        let previous = {
            let mut state = self.state.lock();
            state.retain(app);
            std::mem::replace(&mut state.app, Some(app).filter(|h| !h.is_null()))
        };
        if let Some(previous) = previous {
            self.state.lock().release(previous);
        }
    }

    /// Create a browser with a main frame and return a +1 reference to it.
    /// The engine keeps the browser open until [`close_browser`](Self::close_browser).
    pub fn create_browser(
        &self,
        id: i32,
        main_frame_id: i64,
        client: NativeHandle,
    ) -> NativeHandle {
        let mut state = self.state.lock();
        state.retain(client);
        let browser = state.alloc(
            ObjectKind::Browser,
            Data::Browser {
                id,
                client,
                main_frame: NativeHandle::NULL,
                frames: Vec::new(),
            },
        );
        let frame = self.alloc_frame(&mut state, browser, main_frame_id, true);
        if let Some(Object {
            data: Data::Browser {
                main_frame, frames, ..
            },
            ..
        }) = state.objects.get_mut(&browser.addr())
        {
            *main_frame = frame;
            frames.push((main_frame_id, frame));
        }
        if let Some(old) = state.browsers.insert(id, browser) {
            state.release(old);
        }
        debug!(browser_id = id, %browser, role = ?self.role, "browser created");
        state.retained(browser)
    }

    fn alloc_frame(
        &self,
        state: &mut State,
        browser: NativeHandle,
        id: i64,
        is_main: bool,
    ) -> NativeHandle {
        let frame = state.alloc(
            ObjectKind::Frame,
            Data::Frame {
                id,
                is_main,
                browser,
                context: NativeHandle::NULL,
            },
        );
        if self.role == ProcessRole::ScriptExecutor {
            let context = state.alloc(ObjectKind::V8Context, Data::Context { browser, frame });
            if let Some(Object {
                data: Data::Frame { context: slot, .. },
                ..
            }) = state.objects.get_mut(&frame.addr())
            {
                *slot = context;
            }
        }
        frame
    }

    /// A +1 reference to the open browser with `id`, or NULL.
    pub fn browser(&self, id: i32) -> NativeHandle {
        let mut state = self.state.lock();
        let handle = state.browser_by_id(id);
        state.retained(handle)
    }

    pub fn close_browser(&self, id: i32) -> bool {
        let mut state = self.state.lock();
        match state.browsers.remove(&id) {
            Some(handle) => {
                state.release(handle);
                true
            }
            None => false,
        }
    }

    /// Attach a subframe to browser `browser_id`.
    pub fn add_frame(&self, browser_id: i32, frame_id: i64) -> bool {
        let mut state = self.state.lock();
        let browser = state.browser_by_id(browser_id);
        if browser.is_null() || !state.frame_in_browser(browser, frame_id).is_null() {
            return false;
        }
        let frame = self.alloc_frame(&mut state, browser, frame_id, false);
        if let Some(Object {
            data: Data::Browser { frames, .. },
            ..
        }) = state.objects.get_mut(&browser.addr())
        {
            frames.push((frame_id, frame));
        }
        true
    }

    /// Detach a frame. Proxies may keep it alive, but the browser no
    /// longer resolves its id.
    pub fn remove_frame(&self, browser_id: i32, frame_id: i64) -> bool {
        let mut state = self.state.lock();
        let browser = state.browser_by_id(browser_id);
        let removed = match state.objects.get_mut(&browser.addr()) {
            Some(Object {
                data: Data::Browser {
                    frames, main_frame, ..
                },
                ..
            }) => {
                let index = frames.iter().position(|(id, _)| *id == frame_id);
                let removed = index.map(|i| frames.remove(i).1);
                if removed == Some(*main_frame) {
                    *main_frame = NativeHandle::NULL;
                }
                removed
            }
            _ => None,
        };
        match removed {
            Some(frame) => {
                state.release(frame);
                true
            }
            None => false,
        }
    }

    /// Mark `handle` torn down. Outstanding references stay counted but the
    /// object no longer reports itself valid.
    pub fn detach(&self, handle: NativeHandle) -> bool {
        match self.state.lock().objects.get_mut(&handle.addr()) {
            Some(object) => {
                object.detached = true;
                true
            }
            None => false,
        }
    }

    /// A +1 reference to a new DOM node.
    pub fn create_dom_node(&self, tag_name: &str, editable: bool) -> NativeHandle {
        self.state.lock().alloc(
            ObjectKind::DomNode,
            Data::DomNode {
                tag_name: tag_name.to_ascii_uppercase(),
                editable,
            },
        )
    }

    pub fn set_evaluator(
        &self,
        evaluator: impl Fn(&str) -> Result<Value, ExceptionRecord> + Send + Sync + 'static,
    ) {
        *self.evaluator.write() = Some(Arc::new(evaluator));
    }

    /// Route outgoing messages through `transport` instead of the outbox.
    pub fn set_transport(&self, transport: impl Fn(OutgoingMessage) + Send + Sync + 'static) {
        *self.transport.write() = Some(Arc::new(transport));
    }

    /// Messages sent while no transport was set.
    pub fn take_outbox(&self) -> Vec<OutgoingMessage> {
        std::mem::take(&mut self.state.lock().outbox)
    }

    // -- firing events -------------------------------------------------------

    /// Deliver a message from the process with role `source` to the handler
    /// that owns `browser_id` in this process.
    pub fn deliver(
        &self,
        browser_id: i32,
        source: ProcessRole,
        message: &ProcessMessage,
    ) -> MessageDisposition {
        let browser = self.browser(browser_id);
        if browser.is_null() {
            debug!(browser_id, "message for unknown browser dropped");
            return MessageDisposition::PassThrough;
        }

        let result = match self.role {
            ProcessRole::Controller => {
                let table = {
                    let state = self.state.lock();
                    state
                        .browser_data(browser)
                        .and_then(|(_, client, _, _)| state.object(client))
                        .and_then(|o| o.table)
                };
                match table.as_ref().and_then(CallbackTable::as_client) {
                    Some(t) => {
                        (t.on_process_message_received)(t.back_ref, browser, source, message)
                    }
                    None => 0,
                }
            }
            ProcessRole::ScriptExecutor => self
                .with_render_process_handler(|t| {
                    (t.on_process_message_received)(t.back_ref, browser, source, message)
                })
                .unwrap_or(0),
        };

        self.release(browser);
        MessageDisposition::from_native(result)
    }

    /// Run the application's browser-process `on_context_initialized`.
    pub fn fire_context_initialized(&self) -> bool {
        let Some(app) = self.app_table() else {
            return false;
        };
        let handler = (app.get_browser_process_handler)(app.back_ref);
        let table = self.table(handler).and_then(|t| t.as_browser_process().copied());
        if let Some(t) = table {
            (t.on_context_initialized)(t.back_ref);
        }
        self.release(handler);
        table.is_some()
    }

    pub fn fire_context_created(&self, browser_id: i32, frame_id: i64) -> bool {
        self.with_frame_context(browser_id, frame_id, |t, browser, frame, context| {
            (t.on_context_created)(t.back_ref, browser, frame, context)
        })
    }

    pub fn fire_context_released(&self, browser_id: i32, frame_id: i64) -> bool {
        self.with_frame_context(browser_id, frame_id, |t, browser, frame, context| {
            (t.on_context_released)(t.back_ref, browser, frame, context)
        })
    }

    pub fn fire_uncaught_exception(
        &self,
        browser_id: i32,
        frame_id: i64,
        exception: &ExceptionRecord,
        stack: &[StackFrame],
    ) -> bool {
        self.with_frame_context(browser_id, frame_id, |t, browser, frame, context| {
            (t.on_uncaught_exception)(t.back_ref, browser, frame, context, exception, stack)
        })
    }

    /// `frame_id` and `node` may be absent when focus left the page.
    pub fn fire_focused_node_changed(
        &self,
        browser_id: i32,
        frame_id: Option<i64>,
        node: NativeHandle,
    ) -> bool {
        let (browser, frame) = {
            let mut state = self.state.lock();
            let browser = state.browser_by_id(browser_id);
            let frame =
                frame_id.map_or(NativeHandle::NULL, |id| state.frame_in_browser(browser, id));
            (state.retained(browser), state.retained(frame))
        };
        if browser.is_null() {
            return false;
        }
        let fired = self
            .with_render_process_handler(|t| {
                (t.on_focused_node_changed)(t.back_ref, browser, frame, node)
            })
            .is_some();
        self.release(frame);
        self.release(browser);
        fired
    }

    fn app_table(&self) -> Option<AppTable> {
        let state = self.state.lock();
        let table = state.object(state.app?)?.table?;
        table.as_app().copied()
    }

    /// Look up the render-process handler through the app, run `f` on its
    /// table and release the handler reference again.
    fn with_render_process_handler<R>(
        &self,
        f: impl FnOnce(&RenderProcessTable) -> R,
    ) -> Option<R> {
        let app = self.app_table()?;
        let handler = (app.get_render_process_handler)(app.back_ref);
        let table = self.table(handler).and_then(|t| t.as_render_process().copied());
        let result = table.as_ref().map(f);
        self.release(handler);
        result
    }

    fn with_frame_context(
        &self,
        browser_id: i32,
        frame_id: i64,
        f: impl FnOnce(&RenderProcessTable, NativeHandle, NativeHandle, NativeHandle),
    ) -> bool {
        let (browser, frame, context) = {
            let mut state = self.state.lock();
            let browser = state.browser_by_id(browser_id);
            let frame = state.frame_in_browser(browser, frame_id);
            let context = state.frame_context(frame);
            (
                state.retained(browser),
                state.retained(frame),
                state.retained(context),
            )
        };
        let fired = if browser.is_null() || frame.is_null() || context.is_null() {
            false
        } else {
            self.with_render_process_handler(|t| f(t, browser, frame, context))
                .is_some()
        };
        for handle in [context, frame, browser] {
            self.release(handle);
        }
        fired
    }

    // -- inspection ----------------------------------------------------------

    pub fn table(&self, handle: NativeHandle) -> Option<CallbackTable> {
        self.state.lock().object(handle)?.table
    }

    /// Current reference count, 0 once the object is gone.
    pub fn ref_count(&self, handle: NativeHandle) -> usize {
        self.state.lock().object(handle).map_or(0, |o| o.refs)
    }

    /// Releases ever applied to `handle`.
    pub fn release_count(&self, handle: NativeHandle) -> usize {
        self.state
            .lock()
            .releases_by_handle
            .get(&handle.addr())
            .copied()
            .unwrap_or(0)
    }

    pub fn retain_total(&self) -> usize {
        self.state.lock().retains
    }

    pub fn release_total(&self) -> usize {
        self.state.lock().releases
    }

    /// Releases of handles that were already destroyed. Always 0 when
    /// every owner releases exactly once.
    pub fn over_releases(&self) -> usize {
        self.state.lock().over_releases
    }

    pub fn live_objects(&self) -> usize {
        self.state.lock().objects.len()
    }
}

impl NativeEngine for InMemoryEngine {
    fn create(&self, kind: ObjectKind) -> NativeHandle {
        match kind {
            ObjectKind::Browser
            | ObjectKind::Frame
            | ObjectKind::V8Context
            | ObjectKind::MenuModel
            | ObjectKind::DomNode => {
                warn!(%kind, "create called for an engine-implemented kind");
                NativeHandle::NULL
            }
            _ => self.state.lock().alloc(kind, Data::Handler),
        }
    }

    fn retain(&self, handle: NativeHandle) -> bool {
        let taken = self.state.lock().retain(handle);
        if !taken && !handle.is_null() {
            warn!(%handle, "retain of dead handle");
        }
        taken
    }

    fn release(&self, handle: NativeHandle) -> bool {
        self.state.lock().release(handle)
    }

    fn is_valid(&self, handle: NativeHandle) -> bool {
        self.state.lock().object(handle).is_some_and(|o| !o.detached)
    }

    fn kind_of(&self, handle: NativeHandle) -> Option<ObjectKind> {
        self.state.lock().object(handle).map(|o| o.kind)
    }

    fn install_callbacks(&self, handle: NativeHandle, table: CallbackTable) -> bool {
        let mut state = self.state.lock();
        let Some(object) = state.objects.get_mut(&handle.addr()) else {
            return false;
        };
        if object.table.is_some() || object.kind != table.kind() {
            return false;
        }
        object.table = Some(table);
        true
    }

    fn send_process_message(
        &self,
        browser: NativeHandle,
        target: ProcessRole,
        message: &ProcessMessage,
    ) -> bool {
        if target == self.role {
            debug!(name = %message.name(), "refusing to send a message to our own role");
            return false;
        }
        let Some(browser_id) = self.state.lock().browser_data(browser).map(|(id, ..)| id) else {
            return false;
        };
        let outgoing = OutgoingMessage {
            browser_id: BrowserId(browser_id),
            source: self.role,
            target,
            message: message.clone(),
        };
        let transport = self.transport.read().clone();
        match transport {
            Some(send) => send(outgoing),
            None => self.state.lock().outbox.push(outgoing),
        }
        true
    }

    fn browser_identifier(&self, browser: NativeHandle) -> i32 {
        self.state
            .lock()
            .browser_data(browser)
            .map_or(0, |(id, ..)| id)
    }

    fn browser_main_frame(&self, browser: NativeHandle) -> NativeHandle {
        let mut state = self.state.lock();
        let frame = state
            .browser_data(browser)
            .map_or(NativeHandle::NULL, |(_, _, main, _)| main);
        state.retained(frame)
    }

    fn browser_frame(&self, browser: NativeHandle, frame_id: i64) -> NativeHandle {
        let mut state = self.state.lock();
        let frame = state.frame_in_browser(browser, frame_id);
        state.retained(frame)
    }

    fn browser_frame_identifiers(&self, browser: NativeHandle) -> Vec<i64> {
        self.state
            .lock()
            .browser_data(browser)
            .map(|(_, _, _, frames)| frames.iter().map(|(id, _)| *id).collect())
            .unwrap_or_default()
    }

    fn frame_identifier(&self, frame: NativeHandle) -> i64 {
        match self.state.lock().object(frame).map(|o| &o.data) {
            Some(Data::Frame { id, .. }) => *id,
            _ => 0,
        }
    }

    fn frame_is_main(&self, frame: NativeHandle) -> bool {
        matches!(
            self.state.lock().object(frame).map(|o| &o.data),
            Some(Data::Frame { is_main: true, .. })
        )
    }

    fn frame_browser(&self, frame: NativeHandle) -> NativeHandle {
        let mut state = self.state.lock();
        let browser = match state.object(frame).map(|o| &o.data) {
            Some(Data::Frame { browser, .. }) => *browser,
            _ => NativeHandle::NULL,
        };
        state.retained(browser)
    }

    fn frame_v8_context(&self, frame: NativeHandle) -> NativeHandle {
        let mut state = self.state.lock();
        let context = state.frame_context(frame);
        state.retained(context)
    }

    fn v8_current_context(&self) -> NativeHandle {
        let mut state = self.state.lock();
        let top = state.entered.last().copied().unwrap_or(NativeHandle::NULL);
        state.retained(top)
    }

    fn v8_entered_context(&self) -> NativeHandle {
        self.v8_current_context()
    }

    fn v8_in_context(&self) -> bool {
        !self.state.lock().entered.is_empty()
    }

    fn v8_context_browser(&self, context: NativeHandle) -> NativeHandle {
        let mut state = self.state.lock();
        let browser = match state.object(context).map(|o| &o.data) {
            Some(Data::Context { browser, .. }) => *browser,
            _ => NativeHandle::NULL,
        };
        state.retained(browser)
    }

    fn v8_context_frame(&self, context: NativeHandle) -> NativeHandle {
        let mut state = self.state.lock();
        let frame = match state.object(context).map(|o| &o.data) {
            Some(Data::Context { frame, .. }) => *frame,
            _ => NativeHandle::NULL,
        };
        state.retained(frame)
    }

    fn v8_context_enter(&self, context: NativeHandle) -> bool {
        let mut state = self.state.lock();
        if !state.retain(context) {
            return false;
        }
        state.entered.push(context);
        true
    }

    fn v8_context_exit(&self, context: NativeHandle) -> bool {
        let mut state = self.state.lock();
        if state.entered.last() != Some(&context) {
            return false;
        }
        state.entered.pop();
        state.release(context);
        true
    }

    fn v8_context_eval(
        &self,
        context: NativeHandle,
        code: &str,
        _script_url: Option<&str>,
        _start_line: i32,
    ) -> Result<Value, ExceptionRecord> {
        if !self.is_valid(context) {
            return Err(ExceptionRecord::new("context is not valid"));
        }
        let evaluator = self.evaluator.read().clone();
        match evaluator {
            Some(eval) => eval(code),
            None => Err(ExceptionRecord::new("no script engine attached")),
        }
    }

    fn menu_model_create(&self, delegate: NativeHandle) -> NativeHandle {
        let mut state = self.state.lock();
        let delegate = state.retained(delegate);
        state.alloc(
            ObjectKind::MenuModel,
            Data::MenuModel {
                delegate,
                items: Vec::new(),
            },
        )
    }

    fn menu_model_count(&self, model: NativeHandle) -> usize {
        match self.state.lock().object(model).map(|o| &o.data) {
            Some(Data::MenuModel { items, .. }) => items.len(),
            _ => 0,
        }
    }

    fn menu_model_clear(&self, model: NativeHandle) -> bool {
        self.with_menu_items(model, |items| items.clear())
    }

    fn menu_model_add_separator(&self, model: NativeHandle) -> bool {
        self.with_menu_items(model, |items| items.push(MenuItem::Separator))
    }

    fn menu_model_add_item(&self, model: NativeHandle, command_id: i32, label: &str) -> bool {
        self.with_menu_items(model, |items| {
            items.push(MenuItem::Command {
                id: command_id,
                label: label.to_owned(),
            })
        })
    }

    fn menu_model_command_id_at(&self, model: NativeHandle, index: usize) -> Option<i32> {
        match self.state.lock().object(model).map(|o| &o.data) {
            Some(Data::MenuModel { items, .. }) => match items.get(index)? {
                MenuItem::Command { id, .. } => Some(*id),
                MenuItem::Separator => Some(-1),
            },
            _ => None,
        }
    }

    fn menu_model_label_at(&self, model: NativeHandle, index: usize) -> Option<String> {
        match self.state.lock().object(model).map(|o| &o.data) {
            Some(Data::MenuModel { items, .. }) => match items.get(index)? {
                MenuItem::Command { label, .. } => Some(label.clone()),
                MenuItem::Separator => Some(String::new()),
            },
            _ => None,
        }
    }

    fn dom_node_tag_name(&self, node: NativeHandle) -> String {
        match self.state.lock().object(node).map(|o| &o.data) {
            Some(Data::DomNode { tag_name, .. }) => tag_name.clone(),
            _ => String::new(),
        }
    }

    fn dom_node_is_editable(&self, node: NativeHandle) -> bool {
        matches!(
            self.state.lock().object(node).map(|o| &o.data),
            Some(Data::DomNode { editable: true, .. })
        )
    }
}

impl InMemoryEngine {
    fn with_menu_items(&self, model: NativeHandle, f: impl FnOnce(&mut Vec<MenuItem>)) -> bool {
        match self.state.lock().objects.get_mut(&model.addr()) {
            Some(Object {
                data: Data::MenuModel { items, .. },
                ..
            }) => {
                f(items);
                true
            }
            _ => false,
        }
    }
}
