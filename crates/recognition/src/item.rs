//! Captured images and recognized items.

use serde::{Deserialize, Serialize};

use scanventory_core::{ProductId, Quantity};

/// Confidence assigned when the vision output does not state one.
pub const DEFAULT_CONFIDENCE: f32 = 0.9;

/// A captured image, base64-encoded (optionally as a `data:` URL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageData(String);

impl ImageData {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw base64 payload, with any `data:<mime>;base64,` prefix stripped.
    pub fn base64_payload(&self) -> &str {
        match self.0.split_once(";base64,") {
            Some((prefix, payload)) if prefix.starts_with("data:") => payload,
            _ => &self.0,
        }
    }
}

/// What kind of capture an image is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// One item held up to the camera.
    Single,
    /// A whole shelf section with many items.
    Shelf,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Single => "single",
            ScanMode::Shelf => "shelf",
        }
    }
}

/// One item recognized in a capture.
///
/// `product_id` is `None` until the name matches a catalog entry; unmatched
/// items cannot be committed as counts until matched or registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    pub name: String,
    pub quantity: Quantity,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl RecognizedItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            product_id: None,
            name: name.into(),
            quantity: Quantity::ONE,
            confidence: DEFAULT_CONFIDENCE,
            size: None,
        }
    }

    pub fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set the confidence, clamped into `[0, 1]`.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_product_id(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    pub fn is_matched(&self) -> bool {
        self.product_id.is_some()
    }
}
