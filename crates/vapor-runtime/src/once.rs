//! One-time initialization that can be re-armed.
//!
//! Subsystems register their callbacks lazily, the first time they are
//! used. When the SDK is shut down and initialized again those
//! registrations are gone, so the setup has to run again. A
//! [`ResettableOnce`] behaves like [`std::sync::Once`] until its
//! [`OnceGroup`] is reset, at which point every once in the group is
//! armed again and the shutdown hooks collected by the setup closures run.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::debug;

type Hook = Box<dyn FnOnce() + Send>;

/// Collects work to undo on the next group reset.
#[derive(Default)]
pub struct ShutdownHooks {
    hooks: Vec<Hook>,
}

impl ShutdownHooks {
    pub fn push(&mut self, hook: impl FnOnce() + Send + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

#[derive(Default)]
struct GroupState {
    done_flags: Vec<Weak<AtomicBool>>,
    hooks: Vec<Hook>,
    /// Flags handed out by [`OnceGroup::named`]; kept alive by the group.
    named: HashMap<&'static str, Arc<AtomicBool>>,
}

/// A set of [`ResettableOnce`]s that are reset together.
///
/// The group lock is held while a setup closure runs and while the
/// shutdown hooks run, so setup and reset never interleave. A setup
/// closure must not call into another once of the same group.
#[derive(Clone, Default)]
pub struct OnceGroup {
    state: Arc<Mutex<GroupState>>,
}

impl OnceGroup {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GroupState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a once that belongs to this group.
    pub fn once(&self) -> ResettableOnce {
        ResettableOnce {
            done: Arc::new(AtomicBool::new(false)),
            group: self.clone(),
        }
    }

    /// Returns the once registered under `name`, creating it on first use.
    ///
    /// Every call with the same name shares one flag, so setup guarded by
    /// a named once runs once per reset no matter how many handles ask.
    pub fn named(&self, name: &'static str) -> ResettableOnce {
        let done = Arc::clone(self.lock().named.entry(name).or_default());
        ResettableOnce {
            done,
            group: self.clone(),
        }
    }

    /// Re-arms every once in the group, then runs and discards the
    /// shutdown hooks their setup closures registered, in registration
    /// order.
    pub fn reset(&self) {
        let mut state = self.lock();
        let mut rearmed = 0usize;
        for flag in state.done_flags.drain(..) {
            if let Some(flag) = flag.upgrade() {
                flag.store(false, Ordering::Release);
                rearmed += 1;
            }
        }

        let hooks = std::mem::take(&mut state.hooks);
        debug!(rearmed, hooks = hooks.len(), "once group reset");
        for hook in hooks {
            hook();
        }
    }
}

impl fmt::Debug for OnceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("OnceGroup")
            .field("done", &state.done_flags.len())
            .field("hooks", &state.hooks.len())
            .finish()
    }
}

/// Runs its closure at most once per group reset.
#[derive(Clone)]
pub struct ResettableOnce {
    done: Arc<AtomicBool>,
    group: OnceGroup,
}

impl ResettableOnce {
    /// Runs `f` unless it already ran since creation or the last reset.
    /// Concurrent callers wait until the running call completes.
    ///
    /// Returns `true` if this call ran `f`.
    pub fn call_once<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut ShutdownHooks),
    {
        if self.is_done() {
            return false;
        }

        let mut state = self.group.lock();
        if self.is_done() {
            return false;
        }

        let mut hooks = ShutdownHooks::default();
        f(&mut hooks);

        state.hooks.append(&mut hooks.hooks);
        state.done_flags.push(Arc::downgrade(&self.done));
        self.done.store(true, Ordering::Release);
        true
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}

impl fmt::Debug for ResettableOnce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResettableOnce")
            .field("done", &self.is_done())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn test_call_once_runs_once() {
        let group = OnceGroup::new();
        let once = group.once();
        let runs = AtomicUsize::new(0);

        assert!(once.call_once(|_| {
            runs.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(!once.call_once(|_| {
            runs.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reset_rearms_and_runs_hooks() {
        let group = OnceGroup::new();
        let a = group.once();
        let b = group.once();
        let hooks_run = Arc::new(AtomicUsize::new(0));

        for once in [&a, &b] {
            let hooks_run = hooks_run.clone();
            once.call_once(move |hooks| {
                hooks.push(move || {
                    hooks_run.fetch_add(1, Ordering::SeqCst);
                });
            });
        }
        assert!(a.is_done() && b.is_done());

        group.reset();
        assert!(!a.is_done());
        assert!(!b.is_done());
        assert_eq!(hooks_run.load(Ordering::SeqCst), 2);

        // Hooks are cleared after running.
        group.reset();
        assert_eq!(hooks_run.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_callers_wait_for_first() {
        let group = OnceGroup::new();
        let once = Arc::new(group.once());
        let runs = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let once = once.clone();
                let runs = runs.clone();
                std::thread::spawn(move || {
                    once.call_once(|_| {
                        std::thread::sleep(std::time::Duration::from_millis(10));
                        runs.fetch_add(1, Ordering::SeqCst);
                    });
                    // Whoever returns must observe the completed setup.
                    assert_eq!(runs.load(Ordering::SeqCst), 1);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_named_onces_share_one_flag() {
        let group = OnceGroup::new();
        let runs = AtomicUsize::new(0);

        assert!(group.named("setup").call_once(|_| {
            runs.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(!group.named("setup").call_once(|_| {
            runs.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(group.named("other").call_once(|_| {}));
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        group.reset();
        assert!(!group.named("setup").is_done());
        assert!(group.named("setup").call_once(|_| {
            runs.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dropped_once_is_skipped_on_reset() {
        let group = OnceGroup::new();
        {
            let once = group.once();
            once.call_once(|_| {});
        }
        group.reset();
    }
}
