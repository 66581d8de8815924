use std::fmt;

/// Opaque address of an engine-owned object.
///
/// Only the engine may dereference it. Inside this crate a handle is used
/// for identity alone: equality, hashing and registry keys.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(usize);

impl NativeHandle {
    pub const NULL: Self = Self(0);

    pub const fn from_addr(addr: usize) -> Self {
        Self(addr)
    }

    pub const fn addr(self) -> usize {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeHandle({:#x})", self.0)
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// The native object types this bridge knows how to wrap or implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    // Implemented on the managed side, dispatched through callback tables.
    App,
    Client,
    BrowserProcessHandler,
    RenderProcessHandler,
    ContextMenuHandler,
    DisplayHandler,
    RenderHandler,
    MenuModelDelegate,
    // Implemented by the engine, wrapped by proxies.
    Browser,
    Frame,
    V8Context,
    MenuModel,
    DomNode,
}

impl ObjectKind {
    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::App => "app",
            ObjectKind::Client => "client",
            ObjectKind::BrowserProcessHandler => "browser process handler",
            ObjectKind::RenderProcessHandler => "render process handler",
            ObjectKind::ContextMenuHandler => "context menu handler",
            ObjectKind::DisplayHandler => "display handler",
            ObjectKind::RenderHandler => "render handler",
            ObjectKind::MenuModelDelegate => "menu model delegate",
            ObjectKind::Browser => "browser",
            ObjectKind::Frame => "frame",
            ObjectKind::V8Context => "v8 context",
            ObjectKind::MenuModel => "menu model",
            ObjectKind::DomNode => "dom node",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_handle() {
        assert!(NativeHandle::NULL.is_null());
        assert!(!NativeHandle::from_addr(0x10).is_null());
        assert_eq!(NativeHandle::from_addr(0x10).addr(), 0x10);
    }

    #[test]
    fn handles_format_as_hex() {
        let h = NativeHandle::from_addr(0x1f40);
        assert_eq!(h.to_string(), "0x1f40");
        assert_eq!(format!("{h:?}"), "NativeHandle(0x1f40)");
    }
}
