//! Uncaught script exceptions, from the script executor to the controller.

use cefkit_bridge::{Browser, Frame};
use cefkit_common::{ExceptionRecord, FrameId, ProcessMessage, ProcessRole, ProtocolError};
use tracing::{debug, warn};

use crate::codec::Message;

pub struct ExceptionCapture;

impl ExceptionCapture {
    /// Pack `exception` for `frame` into an `on-uncaught-exception` message.
    ///
    /// Stack frames stay local: only the single-location record crosses
    /// the boundary.
    pub fn capture(frame: &Frame, exception: &ExceptionRecord) -> ProcessMessage {
        Message::UncaughtException {
            frame_id: frame.identifier(),
            exception: exception.clone(),
        }
        .encode()
    }

    /// Script side: send the exception to the controller.
    pub fn report(browser: &Browser, frame: &Frame, exception: &ExceptionRecord) -> bool {
        let message = Self::capture(frame, exception);
        let sent = browser.send_process_message(ProcessRole::Controller, &message);
        if !sent {
            warn!(frame = %frame.identifier(), "uncaught exception could not be reported");
        }
        sent
    }

    /// Controller side: resolve `frame_id` in `browser` and hand the
    /// reconstructed record to `deliver`.
    ///
    /// A frame that is already gone drops the notification without calling
    /// `deliver`. Returns whether it was delivered.
    pub fn replay(
        browser: &Browser,
        frame_id: FrameId,
        exception: &ExceptionRecord,
        deliver: impl FnOnce(&Frame, &ExceptionRecord),
    ) -> bool {
        match Self::resolve_frame(browser, frame_id) {
            Ok(frame) => {
                deliver(&frame, exception);
                true
            }
            Err(e) => {
                debug!(browser = %browser.identifier(), error = %e, "exception dropped");
                false
            }
        }
    }

    /// The frame an exception names, looked up in this process.
    pub fn resolve_frame(browser: &Browser, frame_id: FrameId) -> Result<Frame, ProtocolError> {
        browser
            .frame(frame_id)
            .ok_or(ProtocolError::UnknownFrame(frame_id.0))
    }
}
