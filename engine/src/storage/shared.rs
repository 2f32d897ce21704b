//! Shared index handle for multi-threaded callers.
//!
//! Trees carry no lock of their own. Callers that share an index across
//! threads wrap it in a [`SharedIndex`] and take a shared guard to traverse
//! or an exclusive guard to mutate, never holding both at once.
//!
//! Cursors are detached from the index, so a thread can read a batch under a
//! shared guard, release it, and resume the same cursor under a later guard.
//! A mutation made in between is reported as
//! [`IndexError::ConcurrentModification`] on the cursor's next step.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::storage::error::IndexError;

/// A reference-counted, lock-guarded index.
#[derive(Debug, Default)]
pub struct SharedIndex<I> {
    inner: Arc<RwLock<I>>,
}

impl<I> SharedIndex<I> {
    /// Wrap `index` for sharing.
    #[must_use]
    pub fn new(index: I) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    /// Acquire a shared guard.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::LockPoisoned`] if a writer panicked while
    /// holding the lock.
    pub fn read(&self) -> Result<RwLockReadGuard<'_, I>, IndexError> {
        self.inner.read().map_err(|_| IndexError::LockPoisoned)
    }

    /// Acquire an exclusive guard.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::LockPoisoned`] if a writer panicked while
    /// holding the lock.
    pub fn write(&self) -> Result<RwLockWriteGuard<'_, I>, IndexError> {
        self.inner.write().map_err(|_| IndexError::LockPoisoned)
    }

    /// Number of handles sharing the index.
    #[must_use]
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<I> Clone for SharedIndex<I> {
    #[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
