//! The native engine surface this bridge consumes.
//!
//! Reference conventions:
//! - A handle *returned* from any method here carries one reference that
//!   the caller now owns (wrap it with [`Proxy::from_native`] or release it).
//! - A handle *passed into* a callback slot is borrowed for the duration of
//!   that call; thunks retain it if they keep a wrapper.
//! - `NativeHandle::NULL` stands for "no object".
//!
//! Object accessors may only be called on the thread that owns the handle;
//! the engine enforces that, not this crate.
//!
//! [`Proxy::from_native`]: crate::proxy::Proxy::from_native

use cefkit_common::{ExceptionRecord, ProcessMessage, ProcessRole, Value};

use crate::bridge::CallbackTable;
use crate::handle::{NativeHandle, ObjectKind};

pub trait NativeEngine: Send + Sync {
    // -- lifetime ------------------------------------------------------------

    /// Allocate a managed-implemented object (handler kinds). Returns NULL
    /// when the engine refuses.
    fn create(&self, kind: ObjectKind) -> NativeHandle;

    /// Take one more reference. Returns false, and takes nothing, when the
    /// object is already gone.
    fn retain(&self, handle: NativeHandle) -> bool;

    /// Drop one reference. Returns true when this was the last one and the
    /// object is gone.
    fn release(&self, handle: NativeHandle) -> bool;

    /// True while the object is alive and the engine has not torn it down.
    /// A torn-down object may still have references outstanding.
    fn is_valid(&self, handle: NativeHandle) -> bool;

    fn kind_of(&self, handle: NativeHandle) -> Option<ObjectKind>;

    /// Attach a callback table. Tables are installed once; a second install
    /// on the same object is refused.
    fn install_callbacks(&self, handle: NativeHandle, table: CallbackTable) -> bool;

    // -- transport -----------------------------------------------------------

    /// Queue `message` for the process with role `target`, on the channel of
    /// `browser`. Delivery is FIFO per channel and fire-and-forget.
    fn send_process_message(
        &self,
        browser: NativeHandle,
        target: ProcessRole,
        message: &ProcessMessage,
    ) -> bool;

    // -- browser -------------------------------------------------------------

    fn browser_identifier(&self, browser: NativeHandle) -> i32;
    fn browser_main_frame(&self, browser: NativeHandle) -> NativeHandle;
    fn browser_frame(&self, browser: NativeHandle, frame_id: i64) -> NativeHandle;
    fn browser_frame_identifiers(&self, browser: NativeHandle) -> Vec<i64>;

    // -- frame ---------------------------------------------------------------

    fn frame_identifier(&self, frame: NativeHandle) -> i64;
    fn frame_is_main(&self, frame: NativeHandle) -> bool;
    fn frame_browser(&self, frame: NativeHandle) -> NativeHandle;
    fn frame_v8_context(&self, frame: NativeHandle) -> NativeHandle;

    // -- v8 context ----------------------------------------------------------

    fn v8_current_context(&self) -> NativeHandle;
    fn v8_entered_context(&self) -> NativeHandle;
    fn v8_in_context(&self) -> bool;
    fn v8_context_browser(&self, context: NativeHandle) -> NativeHandle;
    fn v8_context_frame(&self, context: NativeHandle) -> NativeHandle;
    fn v8_context_enter(&self, context: NativeHandle) -> bool;
    fn v8_context_exit(&self, context: NativeHandle) -> bool;
    fn v8_context_eval(
        &self,
        context: NativeHandle,
        code: &str,
        script_url: Option<&str>,
        start_line: i32,
    ) -> Result<Value, ExceptionRecord>;

    // -- menu model ----------------------------------------------------------

    /// Create a menu whose events go to `delegate` (may be NULL). The menu
    /// holds its own reference to the delegate.
    fn menu_model_create(&self, delegate: NativeHandle) -> NativeHandle;
    fn menu_model_count(&self, model: NativeHandle) -> usize;
    fn menu_model_clear(&self, model: NativeHandle) -> bool;
    fn menu_model_add_separator(&self, model: NativeHandle) -> bool;
    fn menu_model_add_item(&self, model: NativeHandle, command_id: i32, label: &str) -> bool;
    fn menu_model_command_id_at(&self, model: NativeHandle, index: usize) -> Option<i32>;
    fn menu_model_label_at(&self, model: NativeHandle, index: usize) -> Option<String>;

    // -- dom node ------------------------------------------------------------

    fn dom_node_tag_name(&self, node: NativeHandle) -> String;
    fn dom_node_is_editable(&self, node: NativeHandle) -> bool;
}
