//! Typed proxies for engine-implemented objects.

mod browser;
mod dom_node;
mod frame;
mod menu_model;
mod v8_context;

pub use browser::{Browser, BrowserKind};
pub use dom_node::{DomNode, DomNodeKind};
pub use frame::{Frame, FrameKind};
pub use menu_model::{MenuModel, MenuModelKind};
pub use v8_context::{V8Context, V8ContextKind};
