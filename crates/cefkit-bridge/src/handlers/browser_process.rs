use std::sync::LazyLock;

use crate::bridge::{BoundHandler, Bridged, CallbackTable, ObjectBridge};
use crate::handle::{NativeHandle, ObjectKind};
use crate::registry::HandleRegistry;

/// Events for the controller process as a whole.
pub trait BrowserProcessHandler: Send + Sync {
    /// The engine finished initializing on the UI thread.
    fn on_context_initialized(&self) {}

    /// The host drives the message loop and should pump again after
    /// `delay_ms` (0 or less means as soon as possible).
    fn on_schedule_message_pump_work(&self, _delay_ms: i64) {}
}

#[derive(Clone, Copy)]
pub struct BrowserProcessTable {
    pub back_ref: NativeHandle,
    pub on_context_initialized: fn(NativeHandle),
    pub on_schedule_message_pump_work: fn(NativeHandle, i64),
}

static BROWSER_PROCESS_HANDLERS: LazyLock<HandleRegistry<BoundHandler<dyn BrowserProcessHandler>>> =
    LazyLock::new(HandleRegistry::new);

impl Bridged for dyn BrowserProcessHandler {
    const KIND: ObjectKind = ObjectKind::BrowserProcessHandler;

    fn registry() -> &'static HandleRegistry<BoundHandler<Self>> {
        &BROWSER_PROCESS_HANDLERS
    }

    fn callback_table(back_ref: NativeHandle) -> CallbackTable {
        CallbackTable::BrowserProcess(BrowserProcessTable {
            back_ref,
            on_context_initialized,
            on_schedule_message_pump_work,
        })
    }
}

fn on_context_initialized(this: NativeHandle) {
    if let Some(bound) = ObjectBridge::resolve::<dyn BrowserProcessHandler>(this) {
        bound.handler().on_context_initialized();
    }
}

fn on_schedule_message_pump_work(this: NativeHandle, delay_ms: i64) {
    if let Some(bound) = ObjectBridge::resolve::<dyn BrowserProcessHandler>(this) {
        bound.handler().on_schedule_message_pump_work(delay_ms);
    }
}
