//! Native object bridge.
//!
//! Maps engine-owned, reference-counted handles to managed wrappers:
//! - [`HandleRegistry`]: weak identity map, at most one live wrapper per handle
//! - [`Proxy`]: owns exactly one native reference, released once on drop
//! - [`ObjectBridge`]: installs callback tables so native events reach
//!   handler trait objects, with safe defaults when the handler is gone
//!
//! The engine itself is reached through [`NativeEngine`].

pub mod bridge;
pub mod engine;
pub mod handle;
pub mod handlers;
pub mod proxy;
pub mod registry;
pub mod wrappers;

#[cfg(any(test, feature = "mock-engine"))]
pub mod mock;

pub use bridge::{Bound, BoundHandler, Bridged, CallbackTable, ObjectBridge};
pub use engine::NativeEngine;
pub use handle::{NativeHandle, ObjectKind};
pub use handlers::{
    App, AppHandlers, AutoResizeAction, BrowserProcessHandler, Client, ClientHandlers,
    ConsoleMessageAction, ContextMenuHandler, DisplayHandler, LogSeverity, MenuModelDelegate,
    MessageDisposition, Point, Rect, RenderHandler, RenderProcessHandler, TooltipAction,
};
pub use proxy::{is_tracked, Proxy, ProxyKind};
pub use registry::HandleRegistry;
pub use wrappers::{Browser, DomNode, Frame, MenuModel, V8Context};
