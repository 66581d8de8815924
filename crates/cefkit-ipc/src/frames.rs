//! Script-side record of which frames have a live JS context.

use std::collections::HashMap;

use cefkit_common::{BrowserId, FrameId};
use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FrameState {
    context_live: bool,
    /// Times a context was created for this frame (reloads create a new one).
    generation: u32,
}

/// Keyed by (browser, frame) since frame ids are only unique per browser.
#[derive(Default)]
pub struct FrameTracker {
    frames: Mutex<HashMap<(BrowserId, FrameId), FrameState>>,
}

impl FrameTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context_created(&self, browser: BrowserId, frame: FrameId) {
        let mut frames = self.frames.lock();
        let state = frames.entry((browser, frame)).or_default();
        state.context_live = true;
        state.generation += 1;
        debug!(%browser, %frame, generation = state.generation, "context live");
    }

    pub fn context_released(&self, browser: BrowserId, frame: FrameId) {
        if let Some(state) = self.frames.lock().get_mut(&(browser, frame)) {
            state.context_live = false;
            debug!(%browser, %frame, "context released");
        }
    }

    /// True between context created and context released.
    pub fn has_context(&self, browser: BrowserId, frame: FrameId) -> bool {
        self.frames
            .lock()
            .get(&(browser, frame))
            .is_some_and(|s| s.context_live)
    }

    /// How many contexts `frame` has had so far.
    pub fn generation(&self, browser: BrowserId, frame: FrameId) -> u32 {
        self.frames
            .lock()
            .get(&(browser, frame))
            .map_or(0, |s| s.generation)
    }

    /// Drop every frame of a closed browser.
    pub fn forget_browser(&self, browser: BrowserId) {
        self.frames.lock().retain(|(b, _), _| *b != browser);
    }

    pub fn live_contexts(&self) -> usize {
        self.frames.lock().values().filter(|s| s.context_live).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const B: BrowserId = BrowserId(1);

    #[test]
    fn lifecycle() {
        let tracker = FrameTracker::new();
        assert!(!tracker.has_context(B, FrameId(10)));

        tracker.context_created(B, FrameId(10));
        assert!(tracker.has_context(B, FrameId(10)));
        assert!(!tracker.has_context(BrowserId(2), FrameId(10)));

        tracker.context_released(B, FrameId(10));
        assert!(!tracker.has_context(B, FrameId(10)));

        tracker.context_created(B, FrameId(10));
        assert_eq!(tracker.generation(B, FrameId(10)), 2);
        assert_eq!(tracker.live_contexts(), 1);
    }

    #[test]
    fn forgetting_a_browser_drops_its_frames() {
        let tracker = FrameTracker::new();
        tracker.context_created(B, FrameId(1));
        tracker.context_created(B, FrameId(2));
        tracker.context_created(BrowserId(2), FrameId(1));

        tracker.forget_browser(B);
        assert_eq!(tracker.live_contexts(), 1);
        assert!(tracker.has_context(BrowserId(2), FrameId(1)));
    }
}
