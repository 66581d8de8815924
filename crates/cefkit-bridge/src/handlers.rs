//! Handler capability traits and their callback tables.
//!
//! Each trait lists the native events one handler kind can receive. All
//! methods have defaults, so an implementation overrides only what it
//! cares about. The per-kind modules hold the table shape, the thunks the
//! engine calls, and the [`Bridged`](crate::bridge::Bridged) impl.

mod app;
mod browser_process;
mod client;
mod context_menu;
mod display;
mod menu_model_delegate;
mod render;
mod render_process;

pub use app::{App, AppHandlers, AppTable};
pub use browser_process::{BrowserProcessHandler, BrowserProcessTable};
pub use client::{Client, ClientHandlers, ClientTable};
pub use context_menu::{ContextMenuHandler, ContextMenuTable};
pub use display::{
    AutoResizeAction, ConsoleMessageAction, DisplayHandler, DisplayTable, LogSeverity,
    TooltipAction,
};
pub use menu_model_delegate::{MenuModelDelegate, MenuModelDelegateTable};
pub use render::{Point, Rect, RenderHandler, RenderTable};
pub use render_process::{RenderProcessHandler, RenderProcessTable};

/// Whether a process message was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDisposition {
    /// Let the engine's default handling proceed.
    PassThrough,
    /// Fully handled; suppress default handling.
    Consume,
}

impl MessageDisposition {
    pub fn is_consumed(self) -> bool {
        self == MessageDisposition::Consume
    }

    /// Native return convention: 1 for consumed, 0 otherwise.
    pub fn to_native(self) -> i32 {
        match self {
            MessageDisposition::PassThrough => 0,
            MessageDisposition::Consume => 1,
        }
    }

    pub fn from_native(value: i32) -> Self {
        if value != 0 {
            MessageDisposition::Consume
        } else {
            MessageDisposition::PassThrough
        }
    }
}

/// Native boolean convention.
pub(crate) fn native_bool(value: bool) -> i32 {
    i32::from(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_native_convention() {
        assert_eq!(MessageDisposition::Consume.to_native(), 1);
        assert_eq!(MessageDisposition::PassThrough.to_native(), 0);
        assert_eq!(MessageDisposition::from_native(1), MessageDisposition::Consume);
        assert_eq!(MessageDisposition::from_native(0), MessageDisposition::PassThrough);
        assert!(MessageDisposition::Consume.is_consumed());
    }
}
