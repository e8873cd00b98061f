//! The served index reference
//!
//! The bundle is loaded once and treated as immutable; concurrent searches
//! run against the same in-memory value without locking. A rebuild produces
//! a new bundle and atomically swaps the active reference, so in-flight
//! searches keep the generation they started with and never observe a torn
//! bundle.

use super::bundle::IndexBundle;
use parking_lot::RwLock;
use std::sync::Arc;

/// Holds the currently served bundle behind an atomically swappable reference
pub struct ActiveIndex {
    inner: RwLock<Arc<IndexBundle>>,
}

impl ActiveIndex {
    pub fn new(bundle: IndexBundle) -> Self {
        Self {
            inner: RwLock::new(Arc::new(bundle)),
        }
    }

    /// Current bundle. Callers hold the returned `Arc` for the duration of
    /// a search; a concurrent swap does not affect them.
    pub fn current(&self) -> Arc<IndexBundle> {
        self.inner.read().clone()
    }

    /// Replace the served bundle, returning the previous generation.
    pub fn swap(&self, bundle: IndexBundle) -> Arc<IndexBundle> {
        let mut guard = self.inner.write();
        std::mem::replace(&mut *guard, Arc::new(bundle))
    }
}
