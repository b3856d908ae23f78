//! The batch lock serializing grid-mutating edits.
//!
//! [`BatchLock`] is a shared flag. [`BatchLock::try_acquire`] sets it and
//! returns a [`BatchGuard`]; dropping the guard clears it, so every exit
//! path of an edit releases the lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "an edit is in flight" flag.
///
/// Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct BatchLock {
    held: Arc<AtomicBool>,
}

// Compile-time assertion: BatchLock must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<BatchLock>();
};

impl BatchLock {
    /// An unheld lock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an edit currently holds the lock.
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }

    /// Take the lock, or `None` if it is already held.
    pub fn try_acquire(&self) -> Option<BatchGuard> {
        self.held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BatchGuard {
                held: Arc::clone(&self.held),
            })
    }
}

/// Proof of holding a [`BatchLock`]. Releases it on drop.
#[derive(Debug)]
pub struct BatchGuard {
    held: Arc<AtomicBool>,
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        self.held.store(false, Ordering::Release);
    }
}
