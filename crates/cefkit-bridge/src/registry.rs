//! Process-wide weak identity map from native handle to managed wrapper.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::handle::NativeHandle;

/// Maps handle addresses to non-owning references to their wrapper.
///
/// The registry never keeps a wrapper alive: it only lets a second lookup
/// find the wrapper while some owner still holds it. Entries whose wrapper
/// has died are treated as absent and replaced on the next insert.
///
/// The lock is never held while a wrapper is dropped or a handler runs, so
/// callbacks that re-enter the registry cannot deadlock.
pub struct HandleRegistry<T: ?Sized> {
    entries: RwLock<HashMap<usize, Weak<T>>>,
}

impl<T: ?Sized> HandleRegistry<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Associate `wrapper` with `handle`.
    ///
    /// Returns false for a null handle, or when a different live wrapper is
    /// already registered (at most one live wrapper per handle).
    pub fn register(&self, handle: NativeHandle, wrapper: &Arc<T>) -> bool {
        if handle.is_null() {
            return false;
        }
        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(&handle.addr()) {
            if existing.strong_count() > 0 && !ptr_eq(existing, wrapper) {
                debug!(%handle, "register refused: live wrapper already present");
                return false;
            }
        }
        entries.insert(handle.addr(), Arc::downgrade(wrapper));
        trace!(%handle, "wrapper registered");
        true
    }

    /// The live wrapper for `handle`, if any. Absent means "construct one".
    pub fn lookup(&self, handle: NativeHandle) -> Option<Arc<T>> {
        if handle.is_null() {
            return None;
        }
        self.entries.read().get(&handle.addr())?.upgrade()
    }

    /// Return the live wrapper for `handle`, or build and register one.
    ///
    /// The check and the insert happen under one write lock, so concurrent
    /// callers for the same handle always agree on a single wrapper. The
    /// boolean is true when `make` ran.
    pub fn lookup_or_insert_with(
        &self,
        handle: NativeHandle,
        make: impl FnOnce() -> Arc<T>,
    ) -> Option<(Arc<T>, bool)> {
        if handle.is_null() {
            return None;
        }
        if let Some(existing) = self.lookup(handle) {
            return Some((existing, false));
        }
        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(&handle.addr()).and_then(Weak::upgrade) {
            return Some((existing, false));
        }
        let wrapper = make();
        entries.insert(handle.addr(), Arc::downgrade(&wrapper));
        trace!(%handle, "wrapper created");
        Some((wrapper, true))
    }

    /// Remove the entry for `handle` once its wrapper has died.
    ///
    /// Called from wrapper teardown. A live entry is left untouched: it
    /// belongs to a newer wrapper that replaced the dying one. Unregistering
    /// twice is a no-op. Returns true when an entry was removed.
    pub fn unregister(&self, handle: NativeHandle) -> bool {
        let mut entries = self.entries.write();
        match entries.get(&handle.addr()) {
            Some(entry) if entry.strong_count() == 0 => {
                entries.remove(&handle.addr());
                trace!(%handle, "wrapper unregistered");
                true
            }
            Some(_) => {
                debug!(%handle, "unregister skipped: entry owned by a newer wrapper");
                false
            }
            None => {
                debug!(%handle, "unregister of unknown handle ignored");
                false
            }
        }
    }

    /// True when a live wrapper is registered for `handle`.
    pub fn contains(&self, handle: NativeHandle) -> bool {
        self.lookup(handle).is_some()
    }

    /// Number of entries, live or awaiting teardown.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Number of entries whose wrapper is still alive.
    pub fn live_count(&self) -> usize {
        self.entries
            .read()
            .values()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

impl<T: ?Sized> Default for HandleRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn ptr_eq<T: ?Sized>(weak: &Weak<T>, strong: &Arc<T>) -> bool {
    std::ptr::addr_eq(weak.as_ptr(), Arc::as_ptr(strong))
}

#[cfg(test)]
mod tests;
