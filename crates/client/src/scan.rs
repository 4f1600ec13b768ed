//! Connectivity-gated image analysis.

use serde::Serialize;

use scanventory_catalog::ProductCatalog;
use scanventory_core::{Notice, RequestId};
use scanventory_recognition::{Analysis, AnalysisError, ImageData, ScanMode, analyze_image};

use crate::context::ScanContext;

/// What a scan request produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "outcome")]
pub enum ScanOutcome {
    /// The client is offline; the capture was queued for later analysis.
    Queued { request_id: RequestId, message: String },
    /// The capture was analyzed immediately.
    Completed(Analysis),
}

/// Analyze a capture, or queue it when the backend is unreachable.
///
/// The connectivity probe is the gate: when it fails the image goes into the
/// offline queue untouched and the vision collaborator is never called. The
/// queued capture is replayed by the next sync pass.
pub async fn analyze(
    ctx: &ScanContext,
    catalog: &ProductCatalog,
    image: ImageData,
    mode: ScanMode,
) -> Result<ScanOutcome, AnalysisError> {
    if !ctx.monitor.check_connection().await {
        let request = ctx.queue.enqueue_image_request(image, mode).await;
        let message =
            "You're offline. The scan was saved and will be analyzed when the connection returns."
                .to_string();
        return Ok(ScanOutcome::Queued {
            request_id: request.id,
            message,
        });
    }

    match analyze_image(ctx.vision.as_ref(), &image, mode, catalog).await {
        Ok(analysis) => Ok(ScanOutcome::Completed(analysis)),
        Err(err) => {
            ctx.notifier.notify(Notice::warning(err.user_message()));
            Err(err)
        }
    }
}
