//! End-to-end flow: capture offline, restore connectivity, drain the queue.

use std::sync::Arc;
use std::time::Duration;

use scanventory_catalog::{CountMethod, Product, ProductCatalog};
use scanventory_client::{ScanContext, ScanOutcome, analyze, commit_counts};
use scanventory_core::{ProductId, Quantity, RecordingNotifier, RequestId};
use scanventory_infra::{InMemoryBackend, ScriptedVisionClient};
use scanventory_offline::MemoryStorage;
use scanventory_recognition::{ImageData, RecognizedItem, ScanMode, ShelfObservation};
use scanventory_sync::{ConnectionStatus, ConnectivityConfig, SyncError};

struct Harness {
    ctx: ScanContext,
    storage: Arc<MemoryStorage>,
    vision: Arc<ScriptedVisionClient>,
    backend: Arc<InMemoryBackend>,
    notifier: Arc<RecordingNotifier>,
}

/// A context wired to an unreachable probe target: scans and commits take
/// the offline path until connectivity events say otherwise.
async fn offline_harness(products: Vec<Product>) -> Harness {
    // Logs show up under --nocapture, filtered by RUST_LOG.
    scanventory_observability::init();

    let storage = Arc::new(MemoryStorage::new());
    let vision = Arc::new(ScriptedVisionClient::new());
    let backend = Arc::new(InMemoryBackend::with_products(products));
    let notifier = Arc::new(RecordingNotifier::new());
    let config = ConnectivityConfig::new("http://127.0.0.1:9/health")
        .with_timeout(Duration::from_millis(100));
    let ctx = ScanContext::hydrate(
        config,
        storage.clone(),
        vision.clone(),
        backend.clone(),
        notifier.clone(),
    )
    .await
    .unwrap();
    Harness {
        ctx,
        storage,
        vision,
        backend,
        notifier,
    }
}

fn matched(name: &str, product: &str) -> RecognizedItem {
    RecognizedItem::new(name).with_product_id(ProductId::new(product))
}

async fn scan_offline(h: &Harness, payload: &str, mode: ScanMode) -> RequestId {
    let catalog = ProductCatalog::default();
    let outcome = analyze(&h.ctx, &catalog, ImageData::new(payload), mode)
        .await
        .unwrap();
    match outcome {
        ScanOutcome::Queued { request_id, .. } => request_id,
        ScanOutcome::Completed(_) => panic!("scan unexpectedly ran online"),
    }
}

#[tokio::test]
async fn queued_work_drains_when_connectivity_returns() {
    let h = offline_harness(vec![
        Product::new(ProductId::new("p1"), "Ketchup"),
        Product::new(ProductId::new("p2"), "Jasmine Rice"),
    ])
    .await;

    // Two captures and a three-count commit land in the queue.
    let single = scan_offline(&h, "AAAA", ScanMode::Single).await;
    let shelf = scan_offline(&h, "BBBB", ScanMode::Shelf).await;
    let items = [
        matched("Ketchup", "p1"),
        matched("Jasmine Rice", "p2").with_quantity(Quantity::from_tenths(25)),
        matched("Ketchup", "p1"),
    ];
    commit_counts(&h.ctx, &items, CountMethod::Camera).await.unwrap();

    let stats = h.ctx.queue.stats();
    assert_eq!(stats.pending_image_requests, 2);
    assert_eq!(stats.pending_inventory_counts, 3);
    assert_eq!(h.vision.calls(), 0);
    assert!(h.backend.inserted_counts().is_empty());

    // Connectivity returns; the queued captures replay against the fresh
    // catalog and the counts go up as one batch.
    h.vision.push_text("Item 1: ketchup 32oz\nQuantity: 2");
    h.vision
        .push_shelf(vec![ShelfObservation::new("Jasmine Rice").with_count(4.0)]);

    let report = h
        .ctx
        .handle_connectivity_event(true)
        .await
        .unwrap()
        .expect("pending work should trigger a sync");

    assert_eq!(report.requests_replayed, 2);
    assert_eq!(report.requests_failed, 0);
    assert_eq!(report.counts_synced, 3);
    assert_eq!(h.vision.calls(), 2);
    assert_eq!(h.backend.inserted_counts().len(), 3);
    assert_eq!(h.ctx.monitor.status(), ConnectionStatus::Online);
    assert!(!h.ctx.queue.has_pending_work());

    // Replayed results are cached per request, matched to the catalog.
    let single_items = h.ctx.queue.recognized_items(single).unwrap();
    assert_eq!(single_items[0].product_id, Some(ProductId::new("p1")));
    assert_eq!(single_items[0].quantity, Quantity::from_tenths(20));
    let shelf_items = h.ctx.queue.recognized_items(shelf).unwrap();
    assert_eq!(shelf_items[0].product_id, Some(ProductId::new("p2")));

    // The user heard about going offline and coming back.
    let messages = h.notifier.messages();
    assert!(messages.iter().any(|m| m.contains("offline")));
    assert!(messages.iter().any(|m| m.contains("Back online")));
}

#[tokio::test]
async fn a_failed_count_batch_keeps_counts_queued_for_the_next_pass() {
    let h = offline_harness(Vec::new()).await;

    let request = scan_offline(&h, "AAAA", ScanMode::Single).await;
    let items = [matched("Ketchup", "p1"), matched("Mustard", "p2")];
    commit_counts(&h.ctx, &items, CountMethod::Manual).await.unwrap();

    // First restoration: the scan replays, the count batch fails.
    h.vision.push_text("Item 1: Ketchup");
    h.backend.fail_next_insert();
    let err = h.ctx.handle_connectivity_event(true).await.unwrap_err();
    assert!(matches!(err, SyncError::CountCommit(_)));

    assert_eq!(h.vision.calls(), 1);
    assert!(h.ctx.queue.recognized_items(request).is_some());
    assert_eq!(h.ctx.queue.stats().pending_image_requests, 0);
    assert_eq!(h.ctx.queue.pending_inventory_counts().len(), 2);
    assert!(h.backend.inserted_counts().is_empty());
    assert_eq!(h.ctx.monitor.status(), ConnectionStatus::Offline);

    // Second restoration: only the counts remain, and they are not
    // re-analyzed or split.
    let report = h
        .ctx
        .handle_connectivity_event(true)
        .await
        .unwrap()
        .expect("pending counts should trigger a sync");

    assert_eq!(report.requests_replayed, 0);
    assert_eq!(report.counts_synced, 2);
    assert_eq!(h.vision.calls(), 1);
    assert_eq!(h.backend.inserted_counts().len(), 2);
    assert!(!h.ctx.queue.has_pending_work());
}

#[tokio::test]
async fn queued_work_survives_a_restart_before_syncing() {
    let storage = {
        let h = offline_harness(Vec::new()).await;
        scan_offline(&h, "AAAA", ScanMode::Single).await;
        commit_counts(&h.ctx, &[matched("Ketchup", "p1")], CountMethod::Camera)
            .await
            .unwrap();
        h.storage
    };

    // A fresh context over the same storage sees the same pending work.
    let vision = Arc::new(ScriptedVisionClient::new());
    let backend = Arc::new(InMemoryBackend::new());
    let config = ConnectivityConfig::new("http://127.0.0.1:9/health")
        .with_timeout(Duration::from_millis(100));
    let ctx = ScanContext::hydrate(
        config,
        storage,
        vision.clone(),
        backend.clone(),
        Arc::new(RecordingNotifier::new()),
    )
    .await
    .unwrap();

    let stats = ctx.queue.stats();
    assert_eq!(stats.pending_image_requests, 1);
    assert_eq!(stats.pending_inventory_counts, 1);

    vision.push_text("Item 1: Ketchup");
    let report = ctx.handle_connectivity_event(true).await.unwrap().unwrap();
    assert_eq!(report.requests_replayed, 1);
    assert_eq!(report.counts_synced, 1);

    // Completed work can now be compacted away.
    ctx.queue.clear_synced_data().await;
    let stats = ctx.queue.stats();
    assert_eq!(stats.processed_image_requests, 0);
    assert_eq!(stats.cached_results, 0);
}

#[tokio::test]
async fn manual_sync_reports_offline_when_the_probe_fails() {
    let h = offline_harness(Vec::new()).await;
    commit_counts(&h.ctx, &[matched("Ketchup", "p1")], CountMethod::Camera)
        .await
        .unwrap();

    let err = h.ctx.sync_now().await.unwrap_err();
    assert!(matches!(err, SyncError::Offline));
    assert!(h.ctx.queue.has_pending_work());
}
