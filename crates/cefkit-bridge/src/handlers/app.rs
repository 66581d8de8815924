use std::sync::LazyLock;

use crate::bridge::{Bound, BoundHandler, Bridged, CallbackTable, ObjectBridge};
use crate::handle::{NativeHandle, ObjectKind};
use crate::registry::HandleRegistry;

use super::{BrowserProcessHandler, RenderProcessHandler};

/// Process-level entry point: hands the engine its per-process handlers.
pub trait App: Send + Sync {
    fn browser_process_handler(&self) -> Option<Bound<dyn BrowserProcessHandler>> {
        None
    }

    fn render_process_handler(&self) -> Option<Bound<dyn RenderProcessHandler>> {
        None
    }
}

/// An [`App`] that serves whichever handlers it was given.
#[derive(Default, Clone)]
pub struct AppHandlers {
    pub browser_process: Option<Bound<dyn BrowserProcessHandler>>,
    pub render_process: Option<Bound<dyn RenderProcessHandler>>,
}

impl App for AppHandlers {
    fn browser_process_handler(&self) -> Option<Bound<dyn BrowserProcessHandler>> {
        self.browser_process.clone()
    }

    fn render_process_handler(&self) -> Option<Bound<dyn RenderProcessHandler>> {
        self.render_process.clone()
    }
}

#[derive(Clone, Copy)]
pub struct AppTable {
    pub back_ref: NativeHandle,
    pub get_browser_process_handler: fn(NativeHandle) -> NativeHandle,
    pub get_render_process_handler: fn(NativeHandle) -> NativeHandle,
}

static APPS: LazyLock<HandleRegistry<BoundHandler<dyn App>>> = LazyLock::new(HandleRegistry::new);

impl Bridged for dyn App {
    const KIND: ObjectKind = ObjectKind::App;

    fn registry() -> &'static HandleRegistry<BoundHandler<Self>> {
        &APPS
    }

    fn callback_table(back_ref: NativeHandle) -> CallbackTable {
        CallbackTable::App(AppTable {
            back_ref,
            get_browser_process_handler,
            get_render_process_handler,
        })
    }
}

fn get_browser_process_handler(this: NativeHandle) -> NativeHandle {
    let Some(app) = ObjectBridge::resolve::<dyn App>(this) else {
        return NativeHandle::NULL;
    };
    app.handler()
        .browser_process_handler()
        .map_or(NativeHandle::NULL, |h| h.to_native())
}

fn get_render_process_handler(this: NativeHandle) -> NativeHandle {
    let Some(app) = ObjectBridge::resolve::<dyn App>(this) else {
        return NativeHandle::NULL;
    };
    app.handler()
        .render_process_handler()
        .map_or(NativeHandle::NULL, |h| h.to_native())
}
