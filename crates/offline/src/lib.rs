//! `scanventory-offline` — the durable offline queue.
//!
//! **Responsibility:** hold everything captured while disconnected (image
//! requests, finalized counts, cached recognition results) and write every
//! change through to durable storage so nothing is lost across restarts.
//!
//! The queue itself is in-memory and synchronous; durability is delegated to
//! a [`QueueStorage`] implementation. Persistence failures are logged and
//! swallowed: a storage hiccup must never cost the user a capture they just
//! took.

pub mod queue;
pub mod sqlite;
pub mod storage;

pub use queue::{
    OfflineQueue, PendingImageRequest, PendingInventoryCount, QueueSnapshot, QueueStats,
};
pub use sqlite::SqliteStorage;
pub use storage::{MemoryStorage, QueueStorage, StorageError};
