//! Process-scoped context shared across client operations.

use std::sync::Arc;

use scanventory_catalog::ProductCatalog;
use scanventory_core::Notifier;
use scanventory_infra::{BackendError, InventoryBackend};
use scanventory_offline::{OfflineQueue, QueueStorage, StorageError};
use scanventory_recognition::VisionClient;
use scanventory_sync::{ConnectivityConfig, ConnectivityMonitor, SyncEngine, SyncError, SyncReport};

/// Everything a scan-and-sync client needs, wired once at startup.
///
/// All collaborators are explicitly injected; there are no ambient
/// singletons and no implicit teardown. Cloning is cheap and shares state.
#[derive(Clone)]
pub struct ScanContext {
    pub queue: Arc<OfflineQueue>,
    pub monitor: Arc<ConnectivityMonitor>,
    pub vision: Arc<dyn VisionClient>,
    pub backend: Arc<dyn InventoryBackend>,
    pub notifier: Arc<dyn Notifier>,
    engine: Arc<SyncEngine>,
}

impl ScanContext {
    /// Build the context, restoring any queued work from durable storage.
    pub async fn hydrate(
        config: ConnectivityConfig,
        storage: Arc<dyn QueueStorage>,
        vision: Arc<dyn VisionClient>,
        backend: Arc<dyn InventoryBackend>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, StorageError> {
        let queue = Arc::new(OfflineQueue::hydrate(storage).await?);
        let monitor = Arc::new(ConnectivityMonitor::new(config, notifier.clone()));
        let engine = Arc::new(SyncEngine::new(
            queue.clone(),
            monitor.clone(),
            vision.clone(),
            backend.clone(),
            notifier.clone(),
        ));
        Ok(Self {
            queue,
            monitor,
            vision,
            backend,
            notifier,
            engine,
        })
    }

    /// Route an ambient connectivity signal from the host shell.
    ///
    /// Going offline only updates the status. Coming (or staying) online
    /// with queued work pending runs a sync pass and returns its report;
    /// `Ok(None)` means there was nothing to drain.
    pub async fn handle_connectivity_event(
        &self,
        online: bool,
    ) -> Result<Option<SyncReport>, SyncError> {
        if !online {
            self.monitor.note_offline();
            return Ok(None);
        }
        self.monitor.note_online();
        if !self.queue.has_pending_work() {
            return Ok(None);
        }
        self.engine.sync().await.map(Some)
    }

    /// Manual sync trigger: probe first, then drain the queue.
    pub async fn sync_now(&self) -> Result<SyncReport, SyncError> {
        if !self.monitor.check_connection().await {
            tracing::info!("manual sync requested while offline");
            return Err(SyncError::Offline);
        }
        self.engine.sync().await
    }

    /// Fetch the canonical product list for recognition matching.
    pub async fn load_catalog(&self) -> Result<ProductCatalog, BackendError> {
        let products = self.backend.list_products().await?;
        Ok(ProductCatalog::from(products))
    }
}
