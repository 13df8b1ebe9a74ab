//! Single-walker gate for callback delivery.

use std::sync::{Mutex, MutexGuard, TryLockError};

/// Lets one thread at a time deliver callbacks.
///
/// A second pump, whether from another thread or from a handler running
/// inside the first, does not wait: [`try_enter`](Self::try_enter) returns
/// `None` and the caller skips its walk. Whatever it would have delivered
/// is picked up by the walk already in progress or by the next pump.
#[derive(Debug, Default)]
pub(crate) struct DispatchGate {
    walking: Mutex<()>,
}

impl DispatchGate {
    pub(crate) fn try_enter(&self) -> Option<MutexGuard<'_, ()>> {
        match self.walking.try_lock() {
            Ok(guard) => Some(guard),
            // A handler panicked mid-walk; the gate itself holds no state.
            Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_try_enter_while_held_returns_none() {
        let gate = DispatchGate::default();
        let held = gate.try_enter();
        assert!(held.is_some());
        assert!(gate.try_enter().is_none());
    }

    #[test]
    fn test_try_enter_after_release_succeeds() {
        let gate = DispatchGate::default();
        drop(gate.try_enter());
        assert!(gate.try_enter().is_some());
    }

    #[test]
    fn test_try_enter_from_other_thread_while_held_returns_none() {
        let gate = Arc::new(DispatchGate::default());
        let _held = gate.try_enter();

        let other = Arc::clone(&gate);
        let entered = thread::spawn(move || other.try_enter().is_some())
            .join()
            .unwrap();
        assert!(!entered);
    }

    #[test]
    fn test_try_enter_survives_poison() {
        let gate = Arc::new(DispatchGate::default());
        let poisoner = Arc::clone(&gate);
        let _ = thread::spawn(move || {
            let _walking = poisoner.try_enter();
            panic!("handler failed");
        })
        .join();

        assert!(gate.try_enter().is_some());
    }
}
