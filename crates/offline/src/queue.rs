//! The offline queue: pending work captured while disconnected.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{QueueStorage, StorageError};
use scanventory_catalog::InventoryCount;
use scanventory_core::{CountId, RequestId};
use scanventory_recognition::{ImageData, RecognizedItem, ScanMode};

/// An image captured while offline, waiting to be analyzed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingImageRequest {
    pub id: RequestId,
    pub image: ImageData,
    pub mode: ScanMode,
    pub queued_at: DateTime<Utc>,
    #[serde(default)]
    pub processed: bool,
}

/// A finalized count waiting to reach the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingInventoryCount {
    pub count: InventoryCount,
    #[serde(default)]
    pub synced: bool,
}

/// The queue's entire durable state, saved as one value after every change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    #[serde(default)]
    pub image_requests: Vec<PendingImageRequest>,
    #[serde(default)]
    pub inventory_counts: Vec<PendingInventoryCount>,
    #[serde(default)]
    pub recognized_items: HashMap<RequestId, Vec<RecognizedItem>>,
}

/// Counters for progress surfaces ("3 scans waiting to sync").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub pending_image_requests: usize,
    pub processed_image_requests: usize,
    pub pending_inventory_counts: usize,
    pub synced_inventory_counts: usize,
    pub cached_results: usize,
}

/// Durable FIFO queue for offline captures and counts.
///
/// State lives in memory behind a mutex; every mutation writes the whole
/// snapshot through to storage. Enqueue operations return immediately and
/// never fail: if the write-through fails the entry still exists in memory
/// and the failure is only logged.
pub struct OfflineQueue {
    state: Mutex<QueueSnapshot>,
    storage: Arc<dyn QueueStorage>,
}

impl OfflineQueue {
    /// Load queued work from storage, or start empty if nothing was saved.
    pub async fn hydrate(storage: Arc<dyn QueueStorage>) -> Result<Self, StorageError> {
        let snapshot = storage.load().await?.unwrap_or_default();
        if !snapshot.image_requests.is_empty() || !snapshot.inventory_counts.is_empty() {
            tracing::info!(
                image_requests = snapshot.image_requests.len(),
                inventory_counts = snapshot.inventory_counts.len(),
                "restored offline queue from storage"
            );
        }
        Ok(Self {
            state: Mutex::new(snapshot),
            storage,
        })
    }

    /// Queue an image for later analysis. Returns the queued request, with
    /// its id already assigned.
    pub async fn enqueue_image_request(
        &self,
        image: ImageData,
        mode: ScanMode,
    ) -> PendingImageRequest {
        let request = PendingImageRequest {
            id: RequestId::new(),
            image,
            mode,
            queued_at: Utc::now(),
            processed: false,
        };
        self.state().image_requests.push(request.clone());
        tracing::info!(request_id = %request.id, mode = mode.as_str(), "image request queued");
        self.persist().await;
        request
    }

    /// Mark a replayed image request as processed. Unknown or already
    /// processed ids are a no-op, never an error.
    pub async fn mark_image_request_processed(&self, id: RequestId) {
        let changed = {
            let mut state = self.state();
            match state.image_requests.iter_mut().find(|r| r.id == id) {
                Some(request) if !request.processed => {
                    request.processed = true;
                    true
                }
                _ => false,
            }
        };
        if changed {
            self.persist().await;
        } else {
            tracing::debug!(request_id = %id, "mark processed skipped: unknown or already processed");
        }
    }

    /// Queue a finalized count for later submission.
    pub async fn enqueue_inventory_count(&self, count: InventoryCount) {
        tracing::info!(count_id = %count.id, product_id = %count.product_id, "inventory count queued");
        self.state()
            .inventory_counts
            .push(PendingInventoryCount { count, synced: false });
        self.persist().await;
    }

    /// Mark a submitted count as synced. Unknown or already synced ids are a
    /// no-op.
    pub async fn mark_inventory_count_synced(&self, id: CountId) {
        let changed = {
            let mut state = self.state();
            match state.inventory_counts.iter_mut().find(|c| c.count.id == id) {
                Some(pending) if !pending.synced => {
                    pending.synced = true;
                    true
                }
                _ => false,
            }
        };
        if changed {
            self.persist().await;
        } else {
            tracing::debug!(count_id = %id, "mark synced skipped: unknown or already synced");
        }
    }

    /// Store the recognition result for a request, replacing any earlier one.
    pub async fn cache_recognized_items(&self, request_id: RequestId, items: Vec<RecognizedItem>) {
        self.state().recognized_items.insert(request_id, items);
        self.persist().await;
    }

    /// Cached recognition result for a request, if one was stored.
    pub fn recognized_items(&self, request_id: RequestId) -> Option<Vec<RecognizedItem>> {
        self.state().recognized_items.get(&request_id).cloned()
    }

    /// Look up a queued image request by id, processed or not.
    pub fn image_request(&self, id: RequestId) -> Option<PendingImageRequest> {
        self.state().image_requests.iter().find(|r| r.id == id).cloned()
    }

    /// Unprocessed image requests in the order they were queued.
    pub fn pending_image_requests(&self) -> Vec<PendingImageRequest> {
        self.state()
            .image_requests
            .iter()
            .filter(|r| !r.processed)
            .cloned()
            .collect()
    }

    /// Unsynced counts in the order they were queued.
    pub fn pending_inventory_counts(&self) -> Vec<PendingInventoryCount> {
        self.state()
            .inventory_counts
            .iter()
            .filter(|c| !c.synced)
            .cloned()
            .collect()
    }

    /// Whether any queued work is still waiting to sync.
    pub fn has_pending_work(&self) -> bool {
        let state = self.state();
        state.image_requests.iter().any(|r| !r.processed)
            || state.inventory_counts.iter().any(|c| !c.synced)
    }

    /// Drop processed requests, synced counts, and cached results whose
    /// request is gone. Call after the UI has consumed the results.
    pub async fn clear_synced_data(&self) {
        let changed = {
            let mut state = self.state();
            let before = (
                state.image_requests.len(),
                state.inventory_counts.len(),
                state.recognized_items.len(),
            );
            state.image_requests.retain(|r| !r.processed);
            state.inventory_counts.retain(|c| !c.synced);
            let live: HashSet<RequestId> = state.image_requests.iter().map(|r| r.id).collect();
            state.recognized_items.retain(|id, _| live.contains(id));
            let after = (
                state.image_requests.len(),
                state.inventory_counts.len(),
                state.recognized_items.len(),
            );
            if before != after {
                tracing::info!(
                    requests_removed = before.0 - after.0,
                    counts_removed = before.1 - after.1,
                    results_pruned = before.2 - after.2,
                    "cleared synced offline data"
                );
            }
            before != after
        };
        if changed {
            self.persist().await;
        }
    }

    pub fn stats(&self) -> QueueStats {
        let state = self.state();
        let processed = state.image_requests.iter().filter(|r| r.processed).count();
        let synced = state.inventory_counts.iter().filter(|c| c.synced).count();
        QueueStats {
            pending_image_requests: state.image_requests.len() - processed,
            processed_image_requests: processed,
            pending_inventory_counts: state.inventory_counts.len() - synced,
            synced_inventory_counts: synced,
            cached_results: state.recognized_items.len(),
        }
    }

    /// A copy of the full durable state.
    pub fn snapshot(&self) -> QueueSnapshot {
        self.state().clone()
    }

    fn state(&self) -> MutexGuard<'_, QueueSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write the current snapshot through to storage, logging failures
    /// instead of surfacing them.
    async fn persist(&self) {
        let snapshot = self.snapshot();
        if let Err(err) = self.storage.save(&snapshot).await {
            tracing::warn!("failed to persist offline queue state: {err}");
        }
    }
}

impl std::fmt::Debug for OfflineQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineQueue").field("stats", &self.stats()).finish()
    }
}
