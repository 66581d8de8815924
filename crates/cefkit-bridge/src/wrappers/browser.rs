use cefkit_common::{BrowserId, FrameId, ProcessMessage, ProcessRole};

use crate::handle::ObjectKind;
use crate::proxy::{Proxy, ProxyKind};

use super::Frame;

pub struct BrowserKind;

impl ProxyKind for BrowserKind {
    const KIND: ObjectKind = ObjectKind::Browser;
}

/// One browser instance. The same id is used in every process.
pub type Browser = Proxy<BrowserKind>;

impl Proxy<BrowserKind> {
    pub fn identifier(&self) -> BrowserId {
        BrowserId(self.engine().browser_identifier(self.handle()))
    }

    pub fn main_frame(&self) -> Option<Frame> {
        let handle = self.engine().browser_main_frame(self.handle());
        Frame::from_native(self.engine(), handle)
    }

    /// The frame with `id`, if it still belongs to this browser.
    pub fn frame(&self, id: FrameId) -> Option<Frame> {
        let handle = self.engine().browser_frame(self.handle(), id.0);
        Frame::from_native(self.engine(), handle)
    }

    pub fn frame_identifiers(&self) -> Vec<FrameId> {
        self.engine()
            .browser_frame_identifiers(self.handle())
            .into_iter()
            .map(FrameId)
            .collect()
    }

    /// Queue `message` for the peer process with role `target`.
    pub fn send_process_message(&self, target: ProcessRole, message: &ProcessMessage) -> bool {
        self.engine()
            .send_process_message(self.handle(), target, message)
    }
}
