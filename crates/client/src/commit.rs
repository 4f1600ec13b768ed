//! Turning reviewed items into inventory counts.

use serde::Serialize;
use thiserror::Error;

use scanventory_catalog::{CountMethod, InventoryCount, NewProduct, Product};
use scanventory_core::{DomainError, Notice};
use scanventory_infra::BackendError;
use scanventory_recognition::RecognizedItem;

use crate::context::ScanContext;

/// Why a commit or registration was refused.
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("'{name}' is not matched to a catalog product")]
    UnmatchedItem { name: String },

    #[error("client is offline; this operation requires a connection")]
    Offline,

    #[error("invalid product details: {0}")]
    Invalid(#[from] DomainError),

    #[error("backend rejected the submission: {0}")]
    Backend(BackendError),
}

/// Where committed counts ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "outcome")]
pub enum CommitOutcome {
    /// The batch reached the backend.
    Submitted { count: usize },
    /// The client is offline; the counts wait in the queue.
    Queued { count: usize },
}

/// Commit reviewed items as inventory counts.
///
/// Every item must already resolve to a catalog product; the first unmatched
/// one refuses the whole commit before anything is sent. Online, the counts
/// go up as one batch; offline, each is queued for the next sync pass.
pub async fn commit_counts(
    ctx: &ScanContext,
    items: &[RecognizedItem],
    method: CountMethod,
) -> Result<CommitOutcome, CommitError> {
    let mut counts = Vec::with_capacity(items.len());
    for item in items {
        let Some(product_id) = item.product_id.clone() else {
            return Err(CommitError::UnmatchedItem {
                name: item.name.clone(),
            });
        };
        let mut count = InventoryCount::new(product_id, item.quantity, method);
        if let Some(size) = &item.size {
            count = count.with_notes(size.clone());
        }
        counts.push(count);
    }
    if counts.is_empty() {
        return Ok(CommitOutcome::Submitted { count: 0 });
    }

    if !ctx.monitor.check_connection().await {
        for count in counts.iter().cloned() {
            ctx.queue.enqueue_inventory_count(count).await;
        }
        ctx.notifier.notify(Notice::info(format!(
            "You're offline. {} count(s) were saved and will sync when the connection returns.",
            counts.len()
        )));
        return Ok(CommitOutcome::Queued {
            count: counts.len(),
        });
    }

    match ctx.backend.insert_counts(&counts).await {
        Ok(()) => {
            tracing::info!(counts = counts.len(), method = method.as_str(), "counts committed");
            Ok(CommitOutcome::Submitted {
                count: counts.len(),
            })
        }
        Err(err) => {
            tracing::warn!(error = %err, "count submission failed");
            ctx.notifier.notify(Notice::error(
                "Saving counts failed. Check your connection and try again.",
            ));
            Err(CommitError::Backend(err))
        }
    }
}

/// Register an unmatched recognized item as a new catalog product.
///
/// Product creation changes the shared catalog, so it is never queued; the
/// caller gets the stored product back and can re-resolve the session.
pub async fn register_product(
    ctx: &ScanContext,
    item: &RecognizedItem,
) -> Result<Product, CommitError> {
    if !ctx.monitor.check_connection().await {
        ctx.notifier.notify(Notice::warning(
            "Adding products needs a connection. Try again once you're back online.",
        ));
        return Err(CommitError::Offline);
    }

    let mut new_product = NewProduct::new(item.name.clone())?;
    if let Some(size) = &item.size {
        new_product = new_product.with_unit(size.clone());
    }

    match ctx.backend.create_product(new_product).await {
        Ok(product) => {
            tracing::info!(product_id = %product.id, name = %product.name, "product registered");
            Ok(product)
        }
        Err(err) => {
            tracing::warn!(error = %err, "product registration failed");
            ctx.notifier.notify(Notice::error(
                "Adding the product failed. Check your connection and try again.",
            ));
            Err(CommitError::Backend(err))
        }
    }
}
