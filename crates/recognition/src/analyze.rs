//! Image analysis: vision call, parsing and catalog matching.

use thiserror::Error;

use crate::item::{DEFAULT_CONFIDENCE, ImageData, RecognizedItem, ScanMode};
use crate::parser::parse_single_item_text;
use crate::vision::{ShelfObservation, VisionClient, VisionError};
use scanventory_catalog::ProductCatalog;
use scanventory_core::Quantity;

/// Why an analysis produced no usable result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("image analysis timed out")]
    Timeout,

    #[error("vision service is rate limited")]
    RateLimited,

    #[error("no items could be recognized in the image")]
    Unparseable,

    #[error("image analysis failed: {0}")]
    Unknown(String),
}

impl AnalysisError {
    /// Whether retrying the same image later can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AnalysisError::Timeout | AnalysisError::RateLimited)
    }

    /// Short, actionable text for the person holding the camera.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Timeout => {
                "Image analysis timed out. Check your connection and try again.".to_string()
            }
            AnalysisError::RateLimited => {
                "The recognition service is busy. Wait a moment and try again.".to_string()
            }
            AnalysisError::Unparseable => {
                "No items could be recognized. Try recapturing with better lighting.".to_string()
            }
            AnalysisError::Unknown(_) => {
                "Image analysis failed. Try again, or enter the count manually.".to_string()
            }
        }
    }
}

impl From<VisionError> for AnalysisError {
    fn from(err: VisionError) -> Self {
        match err {
            VisionError::Timeout => AnalysisError::Timeout,
            VisionError::RateLimited => AnalysisError::RateLimited,
            // A garbled response reads the same as an unreadable image:
            // recapturing is the realistic way out.
            VisionError::Malformed(_) => AnalysisError::Unparseable,
            VisionError::Transport(message) => AnalysisError::Unknown(message),
        }
    }
}

/// Outcome of a successful analysis.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Analysis {
    pub items: Vec<RecognizedItem>,
    /// What the vision collaborator actually said, kept for review UIs.
    pub summary: String,
}

/// Analyze a captured image against the current catalog.
///
/// Single mode asks for one described item and runs the tolerant parser;
/// shelf mode asks for structured observations and normalizes them. Either
/// way, recognized names are matched against the catalog before returning.
/// Zero extractable items is reported as [`AnalysisError::Unparseable`].
pub async fn analyze_image(
    vision: &dyn VisionClient,
    image: &ImageData,
    mode: ScanMode,
    catalog: &ProductCatalog,
) -> Result<Analysis, AnalysisError> {
    let (mut items, summary) = match mode {
        ScanMode::Single => {
            let text = vision.describe_item(image).await?;
            let items: Vec<RecognizedItem> = parse_single_item_text(&text)
                .into_iter()
                .map(RecognizedItem::from)
                .collect();
            (items, text)
        }
        ScanMode::Shelf => {
            let observations = vision.scan_shelf(image).await?;
            let items = normalize_shelf(observations);
            let summary = format!("{} item(s) recognized on shelf", items.len());
            (items, summary)
        }
    };

    if items.is_empty() {
        tracing::info!(mode = mode.as_str(), "analysis produced no extractable items");
        return Err(AnalysisError::Unparseable);
    }

    resolve_against_catalog(&mut items, catalog);
    tracing::debug!(
        mode = mode.as_str(),
        items = items.len(),
        matched = items.iter().filter(|i| i.is_matched()).count(),
        "image analyzed"
    );
    Ok(Analysis { items, summary })
}

/// Turn raw shelf observations into recognized items.
///
/// Observations with blank names are dropped. Absent or unusable counts
/// default to 1, absent confidences to [`DEFAULT_CONFIDENCE`].
fn normalize_shelf(observations: Vec<ShelfObservation>) -> Vec<RecognizedItem> {
    observations
        .into_iter()
        .filter_map(|obs| {
            let name = obs.name.trim();
            if name.is_empty() {
                return None;
            }
            let quantity = obs
                .count
                .and_then(|count| Quantity::from_f64(count).ok())
                .unwrap_or(Quantity::ONE);
            let confidence = obs.confidence.unwrap_or(DEFAULT_CONFIDENCE);
            let mut item = RecognizedItem::new(name)
                .with_quantity(quantity)
                .with_confidence(confidence);
            if let Some(size) = obs.size.filter(|s| !s.trim().is_empty()) {
                item = item.with_size(size);
            }
            Some(item)
        })
        .collect()
}

fn resolve_against_catalog(items: &mut [RecognizedItem], catalog: &ProductCatalog) {
    for item in items {
        if item.product_id.is_some() {
            continue;
        }
        if let Some(product) = catalog.resolve(&item.name) {
            item.product_id = Some(product.id.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scanventory_catalog::Product;
    use scanventory_core::ProductId;

    /// Vision double that returns one canned response per mode.
    struct CannedVision {
        text: Result<String, VisionError>,
        shelf: Result<Vec<ShelfObservation>, VisionError>,
    }

    impl CannedVision {
        fn text(text: &str) -> Self {
            Self {
                text: Ok(text.to_string()),
                shelf: Ok(Vec::new()),
            }
        }

        fn shelf(observations: Vec<ShelfObservation>) -> Self {
            Self {
                text: Ok(String::new()),
                shelf: Ok(observations),
            }
        }

        fn failing(err: VisionError) -> Self {
            Self {
                text: Err(err.clone()),
                shelf: Err(err),
            }
        }
    }

    #[async_trait]
    impl VisionClient for CannedVision {
        async fn describe_item(&self, _image: &ImageData) -> Result<String, VisionError> {
            self.text.clone()
        }

        async fn scan_shelf(&self, _image: &ImageData) -> Result<Vec<ShelfObservation>, VisionError> {
            self.shelf.clone()
        }
    }

    fn catalog() -> ProductCatalog {
        ProductCatalog::new(vec![
            Product::new(ProductId::new("p1"), "Jasmine Rice"),
            Product::new(ProductId::new("p2"), "Olive Oil"),
        ])
    }

    fn image() -> ImageData {
        ImageData::new("AAAA")
    }

    #[tokio::test]
    async fn single_mode_parses_and_matches_against_the_catalog() {
        let vision = CannedVision::text("Product name: jasmine rice\nQuantity: 2");
        let analysis = analyze_image(&vision, &image(), ScanMode::Single, &catalog())
            .await
            .unwrap();
        assert_eq!(analysis.items.len(), 1);
        assert_eq!(analysis.items[0].product_id, Some(ProductId::new("p1")));
        assert_eq!(analysis.items[0].quantity, Quantity::from_tenths(20));
    }

    #[tokio::test]
    async fn unknown_names_stay_unmatched() {
        let vision = CannedVision::text("Name: Frozen Shrimp");
        let analysis = analyze_image(&vision, &image(), ScanMode::Single, &catalog())
            .await
            .unwrap();
        assert_eq!(analysis.items[0].product_id, None);
        assert!(!analysis.items[0].is_matched());
    }

    #[tokio::test]
    async fn unusable_text_is_reported_as_unparseable() {
        let vision = CannedVision::text("I cannot tell what this is.");
        let err = analyze_image(&vision, &image(), ScanMode::Single, &catalog())
            .await
            .unwrap_err();
        assert_eq!(err, AnalysisError::Unparseable);
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn shelf_mode_normalizes_observations() {
        let vision = CannedVision::shelf(vec![
            ShelfObservation::new("Olive Oil").with_count(3.0).with_confidence(0.8),
            ShelfObservation::new("  "),
            ShelfObservation::new("Mystery Jar"),
        ]);
        let analysis = analyze_image(&vision, &image(), ScanMode::Shelf, &catalog())
            .await
            .unwrap();
        // The blank-named observation is dropped.
        assert_eq!(analysis.items.len(), 2);
        assert_eq!(analysis.items[0].product_id, Some(ProductId::new("p2")));
        assert_eq!(analysis.items[0].quantity, Quantity::from_tenths(30));
        assert_eq!(analysis.items[1].quantity, Quantity::ONE);
        assert_eq!(analysis.items[1].confidence, DEFAULT_CONFIDENCE);
    }

    #[tokio::test]
    async fn empty_shelves_are_unparseable() {
        let vision = CannedVision::shelf(Vec::new());
        let err = analyze_image(&vision, &image(), ScanMode::Shelf, &catalog())
            .await
            .unwrap_err();
        assert_eq!(err, AnalysisError::Unparseable);
    }

    #[tokio::test]
    async fn vision_timeouts_map_to_retryable_errors() {
        let vision = CannedVision::failing(VisionError::Timeout);
        let err = analyze_image(&vision, &image(), ScanMode::Single, &catalog())
            .await
            .unwrap_err();
        assert_eq!(err, AnalysisError::Timeout);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn malformed_responses_read_as_unparseable() {
        let vision = CannedVision::failing(VisionError::Malformed("bad json".into()));
        let err = analyze_image(&vision, &image(), ScanMode::Single, &catalog())
            .await
            .unwrap_err();
        assert_eq!(err, AnalysisError::Unparseable);
    }

    #[test]
    fn every_failure_has_an_actionable_user_message() {
        for err in [
            AnalysisError::Timeout,
            AnalysisError::RateLimited,
            AnalysisError::Unparseable,
            AnalysisError::Unknown("boom".into()),
        ] {
            assert!(!err.user_message().is_empty());
        }
    }
}
