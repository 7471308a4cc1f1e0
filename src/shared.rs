//! Lock-guarded state shared between background workers and the renderer.
//!
//! Readers always get an owned copy and writers always swap or rewrite the
//! whole value under the lock, so no caller can observe a half-applied change
//! and no lock is ever held across I/O.

use std::sync::{Arc, Mutex, MutexGuard};

pub struct Shared<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    // Every write replaces or rewrites the value in one critical section, so a
    // panic mid-write cannot leave a partial state worth refusing.
    fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the whole value, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        std::mem::replace(&mut *self.lock(), value)
    }

    /// Apply `f` atomically; the result becomes visible when the lock drops.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.lock())
    }

    /// Read a projection without copying the whole value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock())
    }
}

impl<T: Clone> Shared<T> {
    /// Point-in-time copy.
    pub fn snapshot(&self) -> T {
        self.lock().clone()
    }
}
