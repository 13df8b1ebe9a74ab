use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{error, info};
use vapor_native::{CallbackPayload, MessageSeverity, NativeApi};

use crate::{
    CallbackRegistry, InitError, MessageHooks, OnceGroup, Registration, ResettableOnce, ThreadGuard,
};

/// Handle to one initialized SDK and the runtime state around it.
///
/// Cheap to clone; every subsystem keeps its own copy. State that must be
/// shared by every handle on the same SDK, rather than per subsystem
/// instance, lives here.
#[derive(Clone)]
pub struct Context {
    native: Arc<dyn NativeApi>,
    registry: Arc<CallbackRegistry>,
    once: OnceGroup,
    /// The P2P size query and the read that follows it must not interleave
    /// with another reader's pair, whichever `Networking` handle it uses.
    packet_reads: Arc<Mutex<()>>,
    messages: Arc<MessageHooks>,
}

impl Context {
    /// Wraps an already-initialized native layer.
    pub fn new(native: Arc<dyn NativeApi>) -> Self {
        let once = OnceGroup::new();
        Self {
            registry: CallbackRegistry::new(Arc::clone(&native)),
            messages: MessageHooks::new(Arc::clone(&native), once.once()),
            native,
            once,
            packet_reads: Arc::new(Mutex::new(())),
        }
    }

    /// Initializes `native` and wraps it.
    pub fn init(native: Arc<dyn NativeApi>) -> Result<Self, InitError> {
        let ok = {
            let _guard = ThreadGuard::acquire(&native);
            native.init()
        };
        if !ok {
            let err = if native.is_steam_running() {
                InitError::InitFailed
            } else {
                InitError::SteamNotRunning
            };
            error!(%err, "platform SDK initialization failed");
            return Err(err);
        }

        info!("platform SDK initialized");
        Ok(Self::new(native))
    }

    pub fn native(&self) -> &Arc<dyn NativeApi> {
        &self.native
    }

    pub fn registry(&self) -> &Arc<CallbackRegistry> {
        &self.registry
    }

    pub fn message_hooks(&self) -> &Arc<MessageHooks> {
        &self.messages
    }

    /// Shorthand for `self.message_hooks().register(severity, hook)`.
    pub fn register_message_hook<F>(&self, severity: MessageSeverity, hook: F) -> Registration
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.messages.register(severity, hook)
    }

    pub fn once_group(&self) -> &OnceGroup {
        &self.once
    }

    /// Shorthand for `self.once_group().once()`.
    pub fn new_once(&self) -> ResettableOnce {
        self.once.once()
    }

    /// Serializes P2P packet reads across every clone of this context.
    pub fn lock_packet_reads(&self) -> MutexGuard<'_, ()> {
        self.packet_reads.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Guard for direct native calls from the current thread.
    pub fn guard(&self) -> ThreadGuard {
        ThreadGuard::acquire(&self.native)
    }

    /// Shorthand for `self.registry().register(handler)`.
    pub fn register<T, F>(&self, handler: F) -> Registration
    where
        T: CallbackPayload,
        F: Fn(T) + Send + Sync + 'static,
    {
        self.registry.register(handler)
    }

    /// Delivers every pending callback on the calling thread.
    pub fn run_callbacks(&self) {
        let _guard = self.guard();
        self.native.run_callbacks(self.registry.as_ref());
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("registry", &self.registry)
            .field("once", &self.once)
            .field("messages", &self.messages)
            .finish()
    }
}
