use std::sync::{Arc, OnceLock};

use super::error::StorageError;
use super::traits::BlobStore;

/// Application-scoped slot for the blob store.
///
/// The handle is created empty at startup and opened once the backing store is
/// ready. Clones share the same slot.
#[derive(Clone, Default)]
pub struct BlobStoreHandle {
    inner: Arc<OnceLock<Arc<dyn BlobStore>>>,
}

impl BlobStoreHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle that is already open.
    pub fn opened(store: Arc<dyn BlobStore>) -> Self {
        let handle = Self::new();
        handle.open(store);
        handle
    }

    /// Install the store. Returns `false` if the handle was already open, in
    /// which case the existing store is kept.
    pub fn open(&self, store: Arc<dyn BlobStore>) -> bool {
        self.inner.set(store).is_ok()
    }

    pub fn is_open(&self) -> bool {
        self.inner.get().is_some()
    }

    /// The opened store, or [`StorageError::Unavailable`] before [`open`](Self::open).
    pub fn get(&self) -> Result<Arc<dyn BlobStore>, StorageError> {
        self.inner.get().cloned().ok_or(StorageError::Unavailable)
    }
}
