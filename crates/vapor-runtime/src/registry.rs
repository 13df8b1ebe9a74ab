//! Callback registry.
//!
//! The native layer only knows about numbered slots. The registry maps
//! each slot to a closure and is the [`CallbackSink`] handed to
//! [`NativeApi::run_callbacks`].
//!
//! # Locking
//!
//! The handler map is guarded by one mutex. [`dispatch`] clones the
//! handler out under the lock and calls it after releasing it, so a
//! handler may itself register or unregister callbacks.
//!
//! [`dispatch`]: CallbackSink::dispatch

use std::collections::HashMap;
use std::fmt;
use std::mem::size_of;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, trace};
use vapor_native::{CallbackId, CallbackPayload, CallbackSink, NativeApi, decode_payload};

use crate::message::MessageHooks;

type Handler = Arc<dyn Fn(&[u8]) + Send + Sync>;

struct Entry {
    /// Every payload for this slot must be exactly this long; the decoder
    /// reinterprets the bytes as a fixed-layout struct.
    payload_size: usize,
    handler: Handler,
}

/// Thread-safe map from callback ids to handlers.
///
/// One registry serves one SDK instance. It is always handled through an
/// `Arc` because every [`Registration`] keeps a weak reference back to it;
/// once the registry is gone, outstanding registrations release nothing.
pub struct CallbackRegistry {
    native: Arc<dyn NativeApi>,
    entries: Mutex<HashMap<CallbackId, Entry>>,
}

impl CallbackRegistry {
    /// Creates an empty registry. Slots are allocated from `native` as
    /// handlers register and returned to it as they unregister.
    pub fn new(native: Arc<dyn NativeApi>) -> Arc<Self> {
        Arc::new(Self {
            native,
            entries: Mutex::new(HashMap::new()),
        })
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CallbackId, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `handler` for every callback of type `T`.
    ///
    /// # Panics
    ///
    /// The handler panics if the native layer ever delivers a payload
    /// whose length is not `size_of::<T>()`.
    pub fn register<T, F>(self: &Arc<Self>, handler: F) -> Registration
    where
        T: CallbackPayload,
        F: Fn(T) + Send + Sync + 'static,
    {
        self.register_raw(size_of::<T>(), T::CALLBACK_TYPE, move |bytes| {
            handler(decode_payload::<T>(bytes))
        })
    }

    /// Registers a handler that receives the undecoded payload bytes.
    pub fn register_raw<F>(self: &Arc<Self>, payload_size: usize, callback_type: i32, handler: F) -> Registration
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        let mut entries = self.entries();
        let id = self.native.register_callback(payload_size, callback_type);
        entries.insert(
            id,
            Entry {
                payload_size,
                handler: Arc::new(handler),
            },
        );
        drop(entries);

        debug!(%id, callback_type, payload_size, "callback registered");

        Registration::new(Target::Callback {
            id,
            registry: Arc::downgrade(self),
        })
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// True when no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn unregister(&self, id: CallbackId) {
        let removed = self.entries().remove(&id);
        if removed.is_some() {
            self.native.unregister_callback(id);
            debug!(%id, "callback unregistered");
        }
    }
}

impl CallbackSink for CallbackRegistry {
    fn dispatch(&self, id: CallbackId, payload: &[u8]) {
        let found = self
            .entries()
            .get(&id)
            .map(|entry| (entry.payload_size, Arc::clone(&entry.handler)));

        let Some((expected, handler)) = found else {
            trace!(%id, "dispatch for unknown callback ignored");
            return;
        };

        assert_eq!(
            payload.len(),
            expected,
            "vapor: payload size mismatch for callback {id}"
        );

        trace!(%id, len = payload.len(), "dispatching callback");
        handler(payload);
    }
}

impl Drop for CallbackRegistry {
    fn drop(&mut self) {
        let entries = self.entries.get_mut().unwrap_or_else(PoisonError::into_inner);
        for id in entries.drain().map(|(id, _)| id) {
            self.native.unregister_callback(id);
        }
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("registrations", &self.len())
            .finish()
    }
}

/// What a [`Registration`] releases.
pub(crate) enum Target {
    Callback {
        id: CallbackId,
        registry: Weak<CallbackRegistry>,
    },
    MessageHook {
        key: u64,
        hooks: Weak<MessageHooks>,
    },
}

/// Capability to remove one registered handler.
///
/// Handed out both for SDK callbacks and for SDK message hooks.
/// Unregistering consumes the registration, so the same slot can never be
/// released twice; a second release could otherwise hit a slot id the
/// native layer has since handed to someone else. Dropping a
/// `Registration` unregisters it as well.
#[must_use = "dropping a Registration immediately unregisters its handler"]
pub struct Registration {
    target: Target,
    /// Cleared once released or forgotten.
    armed: bool,
}

impl Registration {
    pub(crate) fn new(target: Target) -> Self {
        Self { target, armed: true }
    }

    /// The native slot behind a callback registration. `None` for message
    /// hooks, which have no slot of their own.
    pub fn callback_id(&self) -> Option<CallbackId> {
        match &self.target {
            Target::Callback { id, .. } => Some(*id),
            Target::MessageHook { .. } => None,
        }
    }

    /// Removes the handler. After this returns the handler is never
    /// invoked again, except by a dispatch already in progress on
    /// another thread.
    pub fn unregister(mut self) {
        self.release();
    }

    /// Keeps the handler registered for the lifetime of its registry.
    pub fn forget(mut self) {
        self.armed = false;
    }

    fn release(&mut self) {
        if !std::mem::take(&mut self.armed) {
            return;
        }
        match &self.target {
            Target::Callback { id, registry } => {
                if let Some(registry) = registry.upgrade() {
                    registry.unregister(*id);
                }
            }
            Target::MessageHook { key, hooks } => {
                if let Some(hooks) = hooks.upgrade() {
                    hooks.unregister(*key);
                }
            }
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Registration");
        match &self.target {
            Target::Callback { id, .. } => d.field("id", id),
            Target::MessageHook { key, .. } => d.field("message_hook", key),
        };
        d.field("armed", &self.armed).finish()
    }
}
