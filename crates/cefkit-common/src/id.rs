use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

static NEXT_CORRELATION_ID: AtomicI64 = AtomicI64::new(1);

/// Process-unique, monotonically increasing id used to pair a request
/// message with its response. Never returns 0.
pub fn next_correlation_id() -> i64 {
    NEXT_CORRELATION_ID.fetch_add(1, Ordering::Relaxed)
}

/// Engine-assigned browser identifier. Stable across processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BrowserId(pub i32);

impl fmt::Display for BrowserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Engine-assigned frame identifier. Stable across processes and carried
/// on the wire as a single 64-bit slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameId(pub i64);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for FrameId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correlation_ids_are_unique_and_positive() {
        let a = next_correlation_id();
        let b = next_correlation_id();
        assert_ne!(a, b);
        assert!(a > 0);
        assert!(b > a);
    }

    #[test]
    fn correlation_ids_unique_across_threads() {
        let ids: Vec<i64> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| (0..100).map(|_| next_correlation_id()).collect::<Vec<_>>()))
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn ids_display_as_plain_numbers() {
        assert_eq!(BrowserId(3).to_string(), "3");
        assert_eq!(FrameId(-12).to_string(), "-12");
    }

    #[test]
    fn frame_id_serialization() {
        let json = serde_json::to_string(&FrameId(42)).unwrap();
        assert_eq!(json, "42");
        let back: FrameId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FrameId(42));
    }
}
