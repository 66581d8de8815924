use cefkit_common::FrameId;

use crate::handle::ObjectKind;
use crate::proxy::{Proxy, ProxyKind};

use super::{Browser, V8Context};

pub struct FrameKind;

impl ProxyKind for FrameKind {
    const KIND: ObjectKind = ObjectKind::Frame;
}

pub type Frame = Proxy<FrameKind>;

impl Proxy<FrameKind> {
    pub fn identifier(&self) -> FrameId {
        FrameId(self.engine().frame_identifier(self.handle()))
    }

    pub fn is_main(&self) -> bool {
        self.engine().frame_is_main(self.handle())
    }

    pub fn browser(&self) -> Option<Browser> {
        let handle = self.engine().frame_browser(self.handle());
        Browser::from_native(self.engine(), handle)
    }

    /// Only available in the script-executor process, while the frame has
    /// a live JS context.
    pub fn v8_context(&self) -> Option<V8Context> {
        let handle = self.engine().frame_v8_context(self.handle());
        V8Context::from_native(self.engine(), handle)
    }
}
