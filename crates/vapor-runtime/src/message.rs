//! Fan-out for the SDK's diagnostic output.
//!
//! The SDK accepts a single message hook per process. [`MessageHooks`]
//! installs one forwarding hook the first time anybody registers and hands
//! each line to every registered closure of the matching severity. The
//! forwarding hook is removed again when the context's once group resets.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;
use vapor_native::{MessageHook, MessageSeverity, NativeApi};

use crate::registry::Target;
use crate::{Registration, ResettableOnce, ThreadGuard};

type Hook = Arc<dyn Fn(&str) + Send + Sync>;

struct Entry {
    key: u64,
    severity: MessageSeverity,
    hook: Hook,
}

/// Registered debug and warning hooks for one SDK instance.
pub struct MessageHooks {
    native: Arc<dyn NativeApi>,
    /// Guards installation of the forwarding hook.
    install: ResettableOnce,
    next_key: AtomicU64,
    entries: Mutex<Vec<Entry>>,
}

impl MessageHooks {
    pub(crate) fn new(native: Arc<dyn NativeApi>, install: ResettableOnce) -> Arc<Self> {
        Arc::new(Self {
            native,
            install,
            next_key: AtomicU64::new(1),
            entries: Mutex::new(Vec::new()),
        })
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Calls `hook` with every line the SDK prints at `severity`.
    ///
    /// Debug lines only appear when the platform client was started with
    /// `-debug_steamapi`.
    pub fn register<F>(self: &Arc<Self>, severity: MessageSeverity, hook: F) -> Registration
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.install.call_once(|shutdown| {
            let weak = Arc::downgrade(self);
            let forward: MessageHook = Arc::new(move |severity, text| {
                if let Some(hooks) = weak.upgrade() {
                    hooks.dispatch(severity, text);
                }
            });
            {
                let _guard = ThreadGuard::acquire(&self.native);
                self.native.set_message_hook(Some(forward));
            }

            let native = Arc::clone(&self.native);
            shutdown.push(move || {
                let _guard = ThreadGuard::acquire(&native);
                native.set_message_hook(None);
                debug!("SDK message hook removed");
            });
            debug!("SDK message hook installed");
        });

        let key = self.next_key.fetch_add(1, Ordering::Relaxed);
        self.entries().push(Entry {
            key,
            severity,
            hook: Arc::new(hook),
        });
        debug!(key, ?severity, "message hook registered");

        Registration::new(Target::MessageHook {
            key,
            hooks: Arc::downgrade(self),
        })
    }

    /// Hands `text` to every hook registered for `severity`, in
    /// registration order. Hooks run without the table locked, so they may
    /// register or unregister hooks themselves.
    pub fn dispatch(&self, severity: MessageSeverity, text: &str) {
        let hooks: Vec<Hook> = self
            .entries()
            .iter()
            .filter(|entry| entry.severity == severity)
            .map(|entry| Arc::clone(&entry.hook))
            .collect();
        for hook in hooks {
            hook(text);
        }
    }

    /// Number of registered hooks across both severities.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub(crate) fn unregister(&self, key: u64) {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|entry| entry.key != key);
        if entries.len() != before {
            debug!(key, "message hook unregistered");
        }
    }
}

impl fmt::Debug for MessageHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageHooks")
            .field("hooks", &self.len())
            .field("installed", &self.install.is_done())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use vapor_native::FakeNative;

    use super::*;
    use crate::OnceGroup;

    fn setup() -> (Arc<FakeNative>, OnceGroup, Arc<MessageHooks>) {
        let fake = Arc::new(FakeNative::new());
        let group = OnceGroup::new();
        let hooks = MessageHooks::new(fake.clone(), group.once());
        (fake, group, hooks)
    }

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) + Send + Sync + 'static) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        (lines, move |text: &str| sink.lock().unwrap().push(text.to_string()))
    }

    #[test]
    fn test_first_register_installs_native_hook() {
        let (fake, _group, hooks) = setup();
        assert!(!fake.has_message_hook());

        let _reg = hooks.register(MessageSeverity::Warning, |_| {});
        assert!(fake.has_message_hook());
    }

    #[test]
    fn test_dispatch_routes_by_severity() {
        let (fake, _group, hooks) = setup();
        let (warnings, on_warning) = recorder();
        let (debugs, on_debug) = recorder();
        let _w = hooks.register(MessageSeverity::Warning, on_warning);
        let _d = hooks.register(MessageSeverity::Debug, on_debug);

        fake.emit_message(MessageSeverity::Warning, "disk almost full");
        fake.emit_message(MessageSeverity::Debug, "pipe opened");

        assert_eq!(*warnings.lock().unwrap(), vec!["disk almost full"]);
        assert_eq!(*debugs.lock().unwrap(), vec!["pipe opened"]);
    }

    #[test]
    fn test_one_line_fans_out_to_every_hook() {
        let (fake, _group, hooks) = setup();
        let (first, a) = recorder();
        let (second, b) = recorder();
        let _a = hooks.register(MessageSeverity::Warning, a);
        let _b = hooks.register(MessageSeverity::Warning, b);

        fake.emit_message(MessageSeverity::Warning, "x");
        assert_eq!(first.lock().unwrap().len(), 1);
        assert_eq!(second.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_unregister_stops_delivery_to_that_hook_only() {
        let (fake, _group, hooks) = setup();
        let (kept, a) = recorder();
        let (dropped, b) = recorder();
        let _keep = hooks.register(MessageSeverity::Warning, a);
        let gone = hooks.register(MessageSeverity::Warning, b);
        assert_eq!(gone.callback_id(), None);

        gone.unregister();
        fake.emit_message(MessageSeverity::Warning, "after");

        assert_eq!(*kept.lock().unwrap(), vec!["after"]);
        assert!(dropped.lock().unwrap().is_empty());
        assert_eq!(hooks.len(), 1);
    }

    #[test]
    fn test_reset_removes_native_hook_and_reinstalls_on_next_register() {
        let (fake, group, hooks) = setup();
        let _first = hooks.register(MessageSeverity::Warning, |_| {});

        group.reset();
        assert!(!fake.has_message_hook());

        let _second = hooks.register(MessageSeverity::Debug, |_| {});
        assert!(fake.has_message_hook());
    }

    #[test]
    fn test_hooks_dropped_forwarder_is_noop() {
        let (fake, _group, hooks) = setup();
        let reg = hooks.register(MessageSeverity::Warning, |_| panic!("should not run"));
        reg.forget();
        drop(hooks);

        fake.emit_message(MessageSeverity::Warning, "late");
    }
}
