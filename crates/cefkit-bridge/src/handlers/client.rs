use std::sync::LazyLock;

use cefkit_common::{ProcessMessage, ProcessRole};

use crate::bridge::{Bound, BoundHandler, Bridged, CallbackTable, ObjectBridge};
use crate::handle::{NativeHandle, ObjectKind};
use crate::registry::HandleRegistry;
use crate::wrappers::Browser;

use super::{ContextMenuHandler, DisplayHandler, MessageDisposition, RenderHandler};

/// Per-browser handler set in the controller process.
pub trait Client: Send + Sync {
    fn context_menu_handler(&self) -> Option<Bound<dyn ContextMenuHandler>> {
        None
    }

    fn display_handler(&self) -> Option<Bound<dyn DisplayHandler>> {
        None
    }

    fn render_handler(&self) -> Option<Bound<dyn RenderHandler>> {
        None
    }

    /// A message arrived from the process with role `source`.
    fn on_process_message_received(
        &self,
        _browser: &Browser,
        _source: ProcessRole,
        _message: &ProcessMessage,
    ) -> MessageDisposition {
        MessageDisposition::PassThrough
    }
}

/// A [`Client`] that serves fixed handlers and passes messages through.
#[derive(Default, Clone)]
pub struct ClientHandlers {
    pub context_menu: Option<Bound<dyn ContextMenuHandler>>,
    pub display: Option<Bound<dyn DisplayHandler>>,
    pub render: Option<Bound<dyn RenderHandler>>,
}

impl Client for ClientHandlers {
    fn context_menu_handler(&self) -> Option<Bound<dyn ContextMenuHandler>> {
        self.context_menu.clone()
    }

    fn display_handler(&self) -> Option<Bound<dyn DisplayHandler>> {
        self.display.clone()
    }

    fn render_handler(&self) -> Option<Bound<dyn RenderHandler>> {
        self.render.clone()
    }
}

#[derive(Clone, Copy)]
pub struct ClientTable {
    pub back_ref: NativeHandle,
    pub get_context_menu_handler: fn(NativeHandle) -> NativeHandle,
    pub get_display_handler: fn(NativeHandle) -> NativeHandle,
    pub get_render_handler: fn(NativeHandle) -> NativeHandle,
    pub on_process_message_received:
        fn(NativeHandle, NativeHandle, ProcessRole, &ProcessMessage) -> i32,
}

static CLIENTS: LazyLock<HandleRegistry<BoundHandler<dyn Client>>> =
    LazyLock::new(HandleRegistry::new);

impl Bridged for dyn Client {
    const KIND: ObjectKind = ObjectKind::Client;

    fn registry() -> &'static HandleRegistry<BoundHandler<Self>> {
        &CLIENTS
    }

    fn callback_table(back_ref: NativeHandle) -> CallbackTable {
        CallbackTable::Client(ClientTable {
            back_ref,
            get_context_menu_handler,
            get_display_handler,
            get_render_handler,
            on_process_message_received,
        })
    }
}

fn get_context_menu_handler(this: NativeHandle) -> NativeHandle {
    ObjectBridge::resolve::<dyn Client>(this)
        .and_then(|client| client.handler().context_menu_handler())
        .map_or(NativeHandle::NULL, |h| h.to_native())
}

fn get_display_handler(this: NativeHandle) -> NativeHandle {
    ObjectBridge::resolve::<dyn Client>(this)
        .and_then(|client| client.handler().display_handler())
        .map_or(NativeHandle::NULL, |h| h.to_native())
}

fn get_render_handler(this: NativeHandle) -> NativeHandle {
    ObjectBridge::resolve::<dyn Client>(this)
        .and_then(|client| client.handler().render_handler())
        .map_or(NativeHandle::NULL, |h| h.to_native())
}

fn on_process_message_received(
    this: NativeHandle,
    browser: NativeHandle,
    source: ProcessRole,
    message: &ProcessMessage,
) -> i32 {
    let Some(client) = ObjectBridge::resolve::<dyn Client>(this) else {
        return 0;
    };
    let Some(browser) = Browser::from_borrowed(client.engine(), browser) else {
        return 0;
    };
    client
        .handler()
        .on_process_message_received(&browser, source, message)
        .to_native()
}
