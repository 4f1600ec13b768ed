//! Durable storage seam for the offline queue.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use thiserror::Error;

use crate::queue::QueueSnapshot;

/// Failure while loading or saving the queue snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("queue snapshot could not be serialized: {0}")]
    Serialization(String),

    #[error("queue persistence failed: {0}")]
    Persistence(String),
}

impl StorageError {
    pub fn serialization(err: impl std::fmt::Display) -> Self {
        Self::Serialization(err.to_string())
    }

    pub fn persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Key-value persistence for the queue snapshot.
///
/// The queue saves its entire state as one snapshot after every mutation and
/// loads it once at startup. Implementations only need to keep the latest
/// snapshot; history is not required.
#[async_trait]
pub trait QueueStorage: Send + Sync {
    /// Load the last saved snapshot, or `None` if nothing was ever saved.
    async fn load(&self) -> Result<Option<QueueSnapshot>, StorageError>;

    /// Replace the stored snapshot.
    async fn save(&self, snapshot: &QueueSnapshot) -> Result<(), StorageError>;
}

/// In-memory storage. Intended for tests and ephemeral dev runs.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<Option<QueueSnapshot>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `save` was called (successfully or not).
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The snapshot currently held, if any.
    pub fn stored(&self) -> Option<QueueSnapshot> {
        self.inner.lock().unwrap().clone()
    }

    /// Make every subsequent `save` fail, for exercising the queue's
    /// log-and-continue behavior.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl QueueStorage for MemoryStorage {
    async fn load(&self) -> Result<Option<QueueSnapshot>, StorageError> {
        Ok(self.inner.lock().unwrap().clone())
    }

    async fn save(&self, snapshot: &QueueSnapshot) -> Result<(), StorageError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::persistence("injected save failure"));
        }
        *self.inner.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }
}
