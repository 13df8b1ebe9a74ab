use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::Arc;

use vapor_native::NativeApi;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Scope for direct calls into the SDK from the current thread.
///
/// The SDK keeps per-thread scratch buffers for string returns and the
/// like. When the outermost guard on a thread is dropped, those buffers
/// are released. Guards nest: inner guards only adjust the depth, so a
/// helper that takes a guard can be called from code that already holds
/// one.
///
/// A guard is tied to the thread that created it and is therefore neither
/// `Send` nor `Sync`. It is not a lock; other threads are unaffected.
pub struct ThreadGuard {
    native: Arc<dyn NativeApi>,
    _thread_bound: PhantomData<*const ()>,
}

impl ThreadGuard {
    pub fn acquire(native: &Arc<dyn NativeApi>) -> Self {
        DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self {
            native: Arc::clone(native),
            _thread_bound: PhantomData,
        }
    }

    /// Number of guards currently held on this thread.
    pub fn depth() -> usize {
        DEPTH.with(Cell::get)
    }
}

impl Drop for ThreadGuard {
    fn drop(&mut self) {
        let remaining = DEPTH.with(|depth| {
            let n = depth.get().saturating_sub(1);
            depth.set(n);
            n
        });
        if remaining == 0 {
            self.native.release_current_thread_memory();
        }
    }
}
