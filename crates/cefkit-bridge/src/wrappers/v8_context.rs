use std::sync::Arc;

use cefkit_common::{ExceptionRecord, Value};

use crate::engine::NativeEngine;
use crate::handle::ObjectKind;
use crate::proxy::{Proxy, ProxyKind};

use super::{Browser, Frame};

pub struct V8ContextKind;

impl ProxyKind for V8ContextKind {
    const KIND: ObjectKind = ObjectKind::V8Context;
}

/// A JS context. Script-executor process only.
pub type V8Context = Proxy<V8ContextKind>;

impl Proxy<V8ContextKind> {
    /// The context on top of the stack, if any.
    pub fn current(engine: &Arc<dyn NativeEngine>) -> Option<Self> {
        Self::from_native(engine, engine.v8_current_context())
    }

    /// The context that was entered last, if any.
    pub fn entered(engine: &Arc<dyn NativeEngine>) -> Option<Self> {
        Self::from_native(engine, engine.v8_entered_context())
    }

    pub fn in_context(engine: &Arc<dyn NativeEngine>) -> bool {
        engine.v8_in_context()
    }

    pub fn browser(&self) -> Option<Browser> {
        let handle = self.engine().v8_context_browser(self.handle());
        Browser::from_native(self.engine(), handle)
    }

    pub fn frame(&self) -> Option<Frame> {
        let handle = self.engine().v8_context_frame(self.handle());
        Frame::from_native(self.engine(), handle)
    }

    /// Enter the context. Calls must be balanced with [`exit`](Self::exit).
    pub fn enter(&self) -> bool {
        self.engine().v8_context_enter(self.handle())
    }

    pub fn exit(&self) -> bool {
        self.engine().v8_context_exit(self.handle())
    }

    /// Evaluate `code`. A thrown exception comes back as the error.
    pub fn eval(
        &self,
        code: &str,
        script_url: Option<&str>,
        start_line: i32,
    ) -> Result<Value, ExceptionRecord> {
        self.engine()
            .v8_context_eval(self.handle(), code, script_url, start_line)
    }
}
