//! Store-wide write serialization.
//!
//! Merges derive their next ids by reading the current maxima, so two merges
//! running side by side against the same store could issue the same ids.
//! Every writer (merges and status changes) holds this lock from its first
//! read to its final save.

use tokio::sync::{Mutex, MutexGuard};

/// A single global write lock for one production store.
#[derive(Debug, Default)]
pub struct StoreWriteLock {
    inner: Mutex<()>,
}

impl StoreWriteLock {
    /// Creates an unlocked write lock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive write access to the store.
    pub async fn acquire(&self) -> MutexGuard<'_, ()> {
        self.inner.lock().await
    }
}
