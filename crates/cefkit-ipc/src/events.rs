//! Protocol notifications for the embedding application.

use cefkit_common::{BrowserId, ExceptionRecord, FrameId};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::codec::FocusedNode;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ProtocolEvent {
    ContextCreated {
        browser: BrowserId,
        frame: FrameId,
    },
    ContextReleased {
        browser: BrowserId,
        frame: FrameId,
    },
    UncaughtException {
        browser: BrowserId,
        frame: FrameId,
        exception: ExceptionRecord,
    },
    ObjectsBound {
        browser: BrowserId,
        names: Vec<String>,
    },
    FocusedNodeChanged {
        browser: BrowserId,
        node: Option<FocusedNode>,
    },
}

pub struct EventBus {
    sender: broadcast::Sender<ProtocolEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProtocolEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ProtocolEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}
