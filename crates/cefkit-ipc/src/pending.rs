//! Application-layer request/response correlation.
//!
//! The router never waits for a response. Callers that want one register
//! a slot here under the correlation id they put on the wire, and the
//! handler for the matching response resolves it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use cefkit_bridge::Browser;
use cefkit_common::{next_correlation_id, ProcessRole, Value};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::debug;

use crate::codec::Message;
use crate::errors::{CallError, RequestError};

type Slots<T> = Arc<Mutex<HashMap<i64, oneshot::Sender<T>>>>;

/// Outstanding requests keyed by correlation id, bounded by `capacity`.
pub struct PendingRequests<T> {
    slots: Slots<T>,
    capacity: usize,
}

impl<T> PendingRequests<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            capacity,
        }
    }

    /// Open a slot under a fresh process-unique id.
    pub fn register(&self) -> Result<PendingRequest<T>, RequestError> {
        self.register_with_id(next_correlation_id())
    }

    /// Open a slot under an id chosen by the caller.
    pub fn register_with_id(&self, id: i64) -> Result<PendingRequest<T>, RequestError> {
        let (sender, receiver) = oneshot::channel();
        {
            let mut slots = self.slots.lock();
            if slots.contains_key(&id) {
                return Err(RequestError::DuplicateId(id));
            }
            if slots.len() >= self.capacity {
                return Err(RequestError::Full(self.capacity));
            }
            slots.insert(id, sender);
        }
        Ok(PendingRequest {
            id,
            receiver,
            slot: SlotGuard {
                id,
                slots: Arc::clone(&self.slots),
            },
        })
    }

    /// Complete request `id`. Unknown ids (late, duplicate or foreign
    /// responses) are ignored and return false.
    pub fn resolve(&self, id: i64, value: T) -> bool {
        let Some(sender) = self.slots.lock().remove(&id) else {
            debug!(id, "response for unknown request ignored");
            return false;
        };
        sender.send(value).is_ok()
    }

    /// Drop request `id`; its waiter sees [`RequestError::Dropped`].
    pub fn cancel(&self, id: i64) -> bool {
        self.slots.lock().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Frees the slot when the waiter goes away, however that happens.
///
/// Must drop after the receiver: only a slot whose receiver is gone is
/// removed, so a newer request that reused the id keeps its slot.
struct SlotGuard<T> {
    id: i64,
    slots: Slots<T>,
}

impl<T> Drop for SlotGuard<T> {
    fn drop(&mut self) {
        let mut slots = self.slots.lock();
        if slots.get(&self.id).is_some_and(oneshot::Sender::is_closed) {
            slots.remove(&self.id);
        }
    }
}

/// The waiting half of one request.
pub struct PendingRequest<T> {
    id: i64,
    receiver: oneshot::Receiver<T>,
    slot: SlotGuard<T>,
}

impl<T> fmt::Debug for PendingRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest").field("id", &self.id).finish()
    }
}

impl<T> PendingRequest<T> {
    /// The correlation id to put on the wire.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Wait for the response, giving up after `timeout`.
    pub async fn wait(self, timeout: Duration) -> Result<T, RequestError> {
        let PendingRequest { id, receiver, slot } = self;
        let result = tokio::time::timeout(timeout, receiver).await;
        drop(slot);
        match result {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(RequestError::Dropped(id)),
            Err(_) => Err(RequestError::Timeout { id, timeout }),
        }
    }
}

impl PendingRequest<Result<Value, String>> {
    /// Send `message`, which must carry [`id`](Self::id), to `target` and
    /// wait for the matching reply.
    pub async fn send_and_wait(
        self,
        browser: &Browser,
        target: ProcessRole,
        message: &Message,
        timeout: Duration,
    ) -> Result<Value, CallError> {
        if !message.send(browser, target) {
            return Err(CallError::SendFailed(target.as_str()));
        }
        self.wait(timeout).await?.map_err(CallError::Remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_wakes_the_waiter() {
        let pending = PendingRequests::new(4);
        let request = pending.register_with_id(42).unwrap();
        assert_eq!(request.id(), 42);

        assert!(pending.resolve(42, 2_i64));
        assert_eq!(request.wait(Duration::from_secs(1)).await, Ok(2));
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn unknown_ids_are_ignored() {
        let pending: PendingRequests<i64> = PendingRequests::new(4);
        assert!(!pending.resolve(99, 1));

        let request = pending.register().unwrap();
        let id = request.id();
        assert!(pending.resolve(id, 1));
        assert!(!pending.resolve(id, 2));
        assert_eq!(request.wait(Duration::from_secs(1)).await, Ok(1));
    }

    #[tokio::test]
    async fn timeout_frees_the_slot() {
        let pending: PendingRequests<i64> = PendingRequests::new(1);
        let request = pending.register_with_id(7).unwrap();
        assert_eq!(pending.register().unwrap_err(), RequestError::Full(1));

        let err = request.wait(Duration::from_millis(50)).await.unwrap_err();
        assert_eq!(
            err,
            RequestError::Timeout {
                id: 7,
                timeout: Duration::from_millis(50)
            }
        );
        assert!(pending.is_empty());
        assert!(!pending.resolve(7, 1));
        assert!(pending.register().is_ok());
    }

    #[tokio::test]
    async fn cancel_reports_dropped() {
        let pending: PendingRequests<i64> = PendingRequests::new(4);
        let request = pending.register_with_id(1).unwrap();
        assert!(pending.cancel(1));
        assert_eq!(
            request.wait(Duration::from_secs(1)).await,
            Err(RequestError::Dropped(1))
        );
    }

    #[test]
    fn duplicate_ids_are_refused() {
        let pending: PendingRequests<i64> = PendingRequests::new(4);
        let _first = pending.register_with_id(5).unwrap();
        assert_eq!(
            pending.register_with_id(5).unwrap_err(),
            RequestError::DuplicateId(5)
        );
    }

    #[tokio::test]
    async fn reused_id_keeps_the_newer_slot() {
        let pending: PendingRequests<i64> = PendingRequests::new(4);
        let old = pending.register_with_id(9).unwrap();
        assert!(pending.resolve(9, 1));
        let new = pending.register_with_id(9).unwrap();

        assert_eq!(old.wait(Duration::from_secs(1)).await, Ok(1));
        assert_eq!(pending.len(), 1);
        assert!(pending.resolve(9, 2));
        assert_eq!(new.wait(Duration::from_secs(1)).await, Ok(2));
    }

    #[test]
    fn abandoned_waiter_releases_its_slot() {
        let pending: PendingRequests<i64> = PendingRequests::new(4);
        let request = pending.register_with_id(5).unwrap();
        assert_eq!(pending.len(), 1);
        drop(request);
        assert!(pending.is_empty());
    }
}
