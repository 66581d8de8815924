//! Carries process messages between the two engines as JSON text frames.
//!
//! Each direction is one unbounded channel. The sending engine's transport
//! pushes frames; a pump task on the other end decodes them and delivers
//! into the receiving engine, preserving FIFO order per direction.

use std::sync::Arc;

use cefkit_bridge::mock::{InMemoryEngine, OutgoingMessage};
use cefkit_common::{ProcessMessage, ProcessRole};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

/// One process message on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub browser_id: i32,
    pub source: ProcessRole,
    pub message: ProcessMessage,
}

impl Envelope {
    pub fn from_outgoing(out: OutgoingMessage) -> Self {
        Self {
            browser_id: out.browser_id.0,
            source: out.source,
            message: out.message,
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Send everything `engine` emits into `tx`.
pub fn attach(engine: &InMemoryEngine, tx: mpsc::UnboundedSender<String>) {
    engine.set_transport(move |out| match Envelope::from_outgoing(out).encode() {
        Ok(frame) => {
            if tx.send(frame).is_err() {
                debug!("link closed, message dropped");
            }
        }
        Err(e) => warn!(error = %e, "failed to encode process message"),
    });
}

/// Deliver frames from `rx` into `engine` until every sender is gone.
pub async fn pump(engine: Arc<InMemoryEngine>, mut rx: mpsc::UnboundedReceiver<String>) {
    while let Some(frame) = rx.recv().await {
        let envelope = match Envelope::decode(&frame) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "undecodable frame dropped");
                continue;
            }
        };
        let disposition =
            engine.deliver(envelope.browser_id, envelope.source, &envelope.message);
        trace!(
            name = envelope.message.name(),
            consumed = disposition.is_consumed(),
            role = ?engine.role(),
            "delivered"
        );
    }
    debug!(role = ?engine.role(), "link pump stopped");
}

#[cfg(test)]
mod tests {
    use cefkit_bridge::{NativeEngine, NativeHandle};
    use cefkit_common::{BrowserId, ListValue};

    use super::*;

    #[test]
    fn envelope_survives_the_wire() {
        let mut args = ListValue::new();
        args.push(42i64);
        args.push(1i64);
        args.push("1+1");
        let envelope = Envelope::from_outgoing(OutgoingMessage {
            browser_id: BrowserId(3),
            source: ProcessRole::Controller,
            target: ProcessRole::ScriptExecutor,
            message: ProcessMessage::with_arguments("evaluate-script-request", args),
        });

        let frame = envelope.encode().unwrap();
        assert!(frame.contains("\"controller\""));
        assert_eq!(Envelope::decode(&frame).unwrap(), envelope);
    }

    #[tokio::test]
    async fn frames_keep_their_order_and_pump_stops_on_close() {
        let sender = Arc::new(InMemoryEngine::new(ProcessRole::Controller));
        let receiver = Arc::new(InMemoryEngine::new(ProcessRole::ScriptExecutor));
        let browser = sender.create_browser(1, 1, NativeHandle::NULL);
        receiver.create_browser(1, 1, NativeHandle::NULL);

        let (tx, mut rx) = mpsc::unbounded_channel();
        attach(&sender, tx);
        let engine: Arc<dyn NativeEngine> = sender.clone();
        for name in ["first", "second"] {
            let message = ProcessMessage::new(name);
            assert!(engine.send_process_message(browser, ProcessRole::ScriptExecutor, &message));
        }
        engine.release(browser);

        let names: Vec<String> = [rx.recv().await, rx.recv().await]
            .into_iter()
            .map(|frame| Envelope::decode(&frame.unwrap()).unwrap().message.name().to_owned())
            .collect();
        assert_eq!(names, ["first", "second"]);

        // The transport owns the only sender.
        drop(engine);
        drop(sender);
        pump(Arc::clone(&receiver), rx).await;
        assert_eq!(receiver.over_releases(), 0);
    }
}
