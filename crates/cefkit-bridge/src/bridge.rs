//! Binding managed handler objects to native counterparts.
//!
//! [`ObjectBridge::install`] asks the engine for a fresh native object of the
//! handler's kind, registers a [`BoundHandler`] for it and attaches the
//! handler's [`CallbackTable`]. Every thunk in that table resolves its
//! target through the handler kind's [`HandleRegistry`]; when the binding
//! has been dropped the thunk returns the slot's safe default.

use std::fmt;
use std::sync::Arc;

use cefkit_common::BridgeError;
use tracing::{debug, trace, warn};

use crate::engine::NativeEngine;
use crate::handle::{NativeHandle, ObjectKind};
use crate::handlers::{
    AppTable, BrowserProcessTable, ClientTable, ContextMenuTable, DisplayTable,
    MenuModelDelegateTable, RenderProcessTable, RenderTable,
};
use crate::registry::HandleRegistry;

/// A handler capability that can be bound to a native object.
///
/// Implemented for the `dyn` handler traits; each has its own registry and
/// callback table shape.
pub trait Bridged: Send + Sync + 'static {
    const KIND: ObjectKind;

    fn registry() -> &'static HandleRegistry<BoundHandler<Self>>;

    /// The table to install on the native object at `back_ref`.
    fn callback_table(back_ref: NativeHandle) -> CallbackTable;
}

/// One handler bound to one native object.
///
/// Owns the native reference returned by `create`; dropping the last
/// [`Bound`] unregisters and releases it. The engine may keep the native
/// object alive past that point, in which case its thunks fall back to
/// safe defaults.
pub struct BoundHandler<H: Bridged + ?Sized> {
    handle: NativeHandle,
    engine: Arc<dyn NativeEngine>,
    handler: Arc<H>,
}

/// Shared ownership of a binding.
pub type Bound<H> = Arc<BoundHandler<H>>;

impl<H: Bridged + ?Sized> BoundHandler<H> {
    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }

    pub fn engine(&self) -> &Arc<dyn NativeEngine> {
        &self.engine
    }

    /// A new reference for handing the object to the engine.
    pub fn to_native(&self) -> NativeHandle {
        self.engine.retain(self.handle);
        self.handle
    }
}

impl<H: Bridged + ?Sized> Drop for BoundHandler<H> {
    fn drop(&mut self) {
        H::registry().unregister(self.handle);
        let destroyed = self.engine.release(self.handle);
        trace!(handle = %self.handle, kind = %H::KIND, destroyed, "handler unbound");
    }
}

impl<H: Bridged + ?Sized> fmt::Debug for BoundHandler<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundHandler")
            .field("kind", &H::KIND)
            .field("handle", &self.handle)
            .finish()
    }
}

pub struct ObjectBridge;

impl ObjectBridge {
    /// Create the native counterpart for `handler` and install its table.
    pub fn install<H: Bridged + ?Sized>(
        engine: &Arc<dyn NativeEngine>,
        handler: Arc<H>,
    ) -> Result<Bound<H>, BridgeError> {
        let handle = engine.create(H::KIND);
        if handle.is_null() {
            warn!(kind = %H::KIND, "engine refused to create handler object");
            return Err(BridgeError::NullHandle);
        }

        // From here on, dropping `bound` releases the fresh reference.
        let bound = Arc::new(BoundHandler {
            handle,
            engine: Arc::clone(engine),
            handler,
        });
        if !H::registry().register(handle, &bound) {
            return Err(BridgeError::AlreadyInstalled(handle.addr()));
        }
        if !engine.install_callbacks(handle, H::callback_table(handle)) {
            warn!(%handle, kind = %H::KIND, "callback table refused");
            return Err(BridgeError::AlreadyInstalled(handle.addr()));
        }

        debug!(%handle, kind = %H::KIND, "handler installed");
        Ok(bound)
    }

    /// The binding behind `back_ref`, if it is still alive.
    pub fn resolve<H: Bridged + ?Sized>(back_ref: NativeHandle) -> Option<Bound<H>> {
        let bound = H::registry().lookup(back_ref);
        if bound.is_none() {
            debug!(handle = %back_ref, kind = %H::KIND, "no live handler, using default");
        }
        bound
    }
}

/// The fixed-shape slot record attached to a native object.
///
/// `back_ref` is the native object's own handle; the engine passes it as
/// the first argument of every slot.
#[derive(Clone, Copy)]
pub enum CallbackTable {
    App(AppTable),
    Client(ClientTable),
    BrowserProcess(BrowserProcessTable),
    RenderProcess(RenderProcessTable),
    ContextMenu(ContextMenuTable),
    MenuModelDelegate(MenuModelDelegateTable),
    Display(DisplayTable),
    Render(RenderTable),
}

impl CallbackTable {
    pub fn kind(&self) -> ObjectKind {
        match self {
            CallbackTable::App(_) => ObjectKind::App,
            CallbackTable::Client(_) => ObjectKind::Client,
            CallbackTable::BrowserProcess(_) => ObjectKind::BrowserProcessHandler,
            CallbackTable::RenderProcess(_) => ObjectKind::RenderProcessHandler,
            CallbackTable::ContextMenu(_) => ObjectKind::ContextMenuHandler,
            CallbackTable::MenuModelDelegate(_) => ObjectKind::MenuModelDelegate,
            CallbackTable::Display(_) => ObjectKind::DisplayHandler,
            CallbackTable::Render(_) => ObjectKind::RenderHandler,
        }
    }

    pub fn back_ref(&self) -> NativeHandle {
        match self {
            CallbackTable::App(t) => t.back_ref,
            CallbackTable::Client(t) => t.back_ref,
            CallbackTable::BrowserProcess(t) => t.back_ref,
            CallbackTable::RenderProcess(t) => t.back_ref,
            CallbackTable::ContextMenu(t) => t.back_ref,
            CallbackTable::MenuModelDelegate(t) => t.back_ref,
            CallbackTable::Display(t) => t.back_ref,
            CallbackTable::Render(t) => t.back_ref,
        }
    }

    pub fn as_app(&self) -> Option<&AppTable> {
        match self {
            CallbackTable::App(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_client(&self) -> Option<&ClientTable> {
        match self {
            CallbackTable::Client(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_browser_process(&self) -> Option<&BrowserProcessTable> {
        match self {
            CallbackTable::BrowserProcess(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_render_process(&self) -> Option<&RenderProcessTable> {
        match self {
            CallbackTable::RenderProcess(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_context_menu(&self) -> Option<&ContextMenuTable> {
        match self {
            CallbackTable::ContextMenu(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_menu_model_delegate(&self) -> Option<&MenuModelDelegateTable> {
        match self {
            CallbackTable::MenuModelDelegate(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_display(&self) -> Option<&DisplayTable> {
        match self {
            CallbackTable::Display(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_render(&self) -> Option<&RenderTable> {
        match self {
            CallbackTable::Render(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Debug for CallbackTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallbackTable({}, {})", self.kind(), self.back_ref())
    }
}
