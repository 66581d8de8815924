//! Managed wrappers that own one native reference.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, LazyLock};

use cefkit_common::BridgeError;
use tracing::{debug, trace, warn};

use crate::engine::NativeEngine;
use crate::handle::{NativeHandle, ObjectKind};
use crate::registry::HandleRegistry;

/// Identity map shared by every proxy in the process.
static PROXIES: LazyLock<HandleRegistry<ProxyCore>> = LazyLock::new(HandleRegistry::new);

/// Marker for the engine object type a [`Proxy`] wraps.
pub trait ProxyKind: Send + Sync + 'static {
    const KIND: ObjectKind;
}

/// The single owner of one native reference.
pub(crate) struct ProxyCore {
    handle: NativeHandle,
    kind: ObjectKind,
    engine: Arc<dyn NativeEngine>,
}

impl Drop for ProxyCore {
    fn drop(&mut self) {
        PROXIES.unregister(self.handle);
        let destroyed = self.engine.release(self.handle);
        trace!(handle = %self.handle, kind = %self.kind, destroyed, "proxy released");
    }
}

/// A typed, cloneable view of an engine object.
///
/// Every clone, and every proxy obtained for the same handle through
/// [`Proxy::from_native`] while one is alive, shares a single core. The
/// core holds exactly one native reference and releases it exactly once
/// when the last clone goes away.
pub struct Proxy<K: ProxyKind> {
    core: Arc<ProxyCore>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ProxyKind> Proxy<K> {
    /// Adopt a reference handed out by the engine.
    ///
    /// Returns `None` for NULL or dead handles. When a live proxy already
    /// exists for the handle, the incoming reference is released and the
    /// existing core is shared, so native releases always balance retains.
    pub fn from_native(engine: &Arc<dyn NativeEngine>, handle: NativeHandle) -> Option<Self> {
        Self::try_from_native(engine, handle)
            .map_err(|e| {
                if !matches!(e, BridgeError::NullHandle) {
                    warn!(%handle, error = %e, "cannot wrap native handle");
                }
            })
            .ok()
    }

    /// Like [`Proxy::from_native`] but reports why wrapping failed.
    pub fn try_from_native(
        engine: &Arc<dyn NativeEngine>,
        handle: NativeHandle,
    ) -> Result<Self, BridgeError> {
        if handle.is_null() {
            return Err(BridgeError::NullHandle);
        }
        let Some(actual) = engine.kind_of(handle).filter(|_| engine.is_valid(handle)) else {
            return Err(BridgeError::InvalidHandle(handle.addr()));
        };

        let (core, created) = PROXIES
            .lookup_or_insert_with(handle, || {
                Arc::new(ProxyCore {
                    handle,
                    kind: actual,
                    engine: Arc::clone(engine),
                })
            })
            .ok_or(BridgeError::NullHandle)?;
        if !created {
            // The live core already owns a reference; this one is surplus.
            engine.release(handle);
        }

        if core.kind != K::KIND {
            return Err(BridgeError::KindMismatch {
                handle: handle.addr(),
                expected: K::KIND.name(),
                actual: core.kind.name(),
            });
        }
        Ok(Self {
            core,
            _kind: PhantomData,
        })
    }

    /// Wrap a handle borrowed from a callback, taking a reference of our own.
    pub fn from_borrowed(engine: &Arc<dyn NativeEngine>, handle: NativeHandle) -> Option<Self> {
        if handle.is_null() || !engine.retain(handle) {
            return None;
        }
        match Self::try_from_native(engine, handle) {
            Ok(proxy) => Some(proxy),
            // A mismatched kind has already handed our reference back.
            Err(BridgeError::KindMismatch { .. }) => None,
            Err(e) => {
                debug!(%handle, error = %e, "dropping borrowed reference");
                engine.release(handle);
                None
            }
        }
    }

    pub fn handle(&self) -> NativeHandle {
        self.core.handle
    }

    pub fn engine(&self) -> &Arc<dyn NativeEngine> {
        &self.core.engine
    }

    /// A new reference for passing back into the engine.
    pub fn to_native(&self) -> NativeHandle {
        self.core.engine.retain(self.core.handle);
        self.core.handle
    }

    /// True when both proxies point at the same native object.
    pub fn is_same(&self, other: &Self) -> bool {
        self.core.handle == other.core.handle
    }

    /// False once the engine has torn the object down underneath us.
    pub fn is_valid(&self) -> bool {
        self.core.engine.is_valid(self.core.handle)
    }
}

impl<K: ProxyKind> Clone for Proxy<K> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            _kind: PhantomData,
        }
    }
}

impl<K: ProxyKind> fmt::Debug for Proxy<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", K::KIND, self.core.handle)
    }
}

/// True while some proxy for `handle` is alive in this process.
pub fn is_tracked(handle: NativeHandle) -> bool {
    PROXIES.contains(handle)
}
