//! Drains the offline queue when connectivity returns.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use scanventory_catalog::{InventoryCount, ProductCatalog};
use scanventory_core::{Notice, Notifier};
use scanventory_infra::{BackendError, InventoryBackend};
use scanventory_offline::OfflineQueue;
use scanventory_recognition::{VisionClient, analyze_image};

use crate::connectivity::ConnectivityMonitor;

/// Why a sync pass could not run to completion.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("client is offline")]
    Offline,
    #[error("could not fetch the product catalog: {0}")]
    CatalogFetch(BackendError),
    #[error("could not submit queued inventory counts: {0}")]
    CountCommit(BackendError),
}

/// What a sync pass accomplished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub requests_replayed: usize,
    pub requests_failed: usize,
    pub counts_synced: usize,
    pub nothing_to_do: bool,
}

impl SyncReport {
    pub fn nothing_to_do() -> Self {
        Self {
            nothing_to_do: true,
            ..Self::default()
        }
    }
}

/// Replays queued image requests and submits queued counts.
///
/// Image replays are independent best-effort: one bad request is logged,
/// counted, and left pending for the next pass. Counts mutate stock levels
/// and go up as a single all-or-nothing batch.
pub struct SyncEngine {
    queue: Arc<OfflineQueue>,
    monitor: Arc<ConnectivityMonitor>,
    vision: Arc<dyn VisionClient>,
    backend: Arc<dyn InventoryBackend>,
    notifier: Arc<dyn Notifier>,
}

impl SyncEngine {
    pub fn new(
        queue: Arc<OfflineQueue>,
        monitor: Arc<ConnectivityMonitor>,
        vision: Arc<dyn VisionClient>,
        backend: Arc<dyn InventoryBackend>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            queue,
            monitor,
            vision,
            backend,
            notifier,
        }
    }

    /// Run one sync pass over everything currently queued.
    ///
    /// Entries that were already processed or synced are never re-sent, so
    /// calling this again after a partial failure finishes the remainder.
    pub async fn sync(&self) -> Result<SyncReport, SyncError> {
        if !self.queue.has_pending_work() {
            tracing::debug!("offline queue is empty, nothing to sync");
            return Ok(SyncReport::nothing_to_do());
        }

        self.monitor.begin_sync();
        tracing::info!("sync pass started");

        // Recognition results must resolve against the canonical product
        // list, so the catalog comes first and its failure aborts the pass.
        let catalog = match self.backend.list_products().await {
            Ok(products) => ProductCatalog::from(products),
            Err(err) => {
                tracing::warn!(error = %err, "catalog fetch failed, aborting sync pass");
                self.monitor.finish_sync(false);
                return Err(SyncError::CatalogFetch(err));
            }
        };

        let mut report = SyncReport::default();
        for request in self.queue.pending_image_requests() {
            let analysis =
                analyze_image(self.vision.as_ref(), &request.image, request.mode, &catalog).await;
            match analysis {
                Ok(analysis) => {
                    self.queue
                        .cache_recognized_items(request.id, analysis.items)
                        .await;
                    self.queue.mark_image_request_processed(request.id).await;
                    report.requests_replayed += 1;
                }
                Err(err) => {
                    tracing::warn!(request_id = %request.id, error = %err, "queued scan replay failed");
                    report.requests_failed += 1;
                }
            }
        }

        let pending = self.queue.pending_inventory_counts();
        if !pending.is_empty() {
            let counts: Vec<InventoryCount> =
                pending.into_iter().map(|entry| entry.count).collect();
            if let Err(err) = self.backend.insert_counts(&counts).await {
                tracing::warn!(error = %err, counts = counts.len(), "count batch submission failed");
                self.monitor.finish_sync(false);
                self.notifier.notify(Notice::warning(
                    "Could not submit queued counts. They stay saved and will retry on the next sync.",
                ));
                return Err(SyncError::CountCommit(err));
            }
            for count in &counts {
                self.queue.mark_inventory_count_synced(count.id).await;
            }
            report.counts_synced = counts.len();
        }

        self.monitor.finish_sync(true);
        tracing::info!(
            replayed = report.requests_replayed,
            failed = report.requests_failed,
            counts = report.counts_synced,
            "sync pass complete"
        );
        Ok(report)
    }
}
