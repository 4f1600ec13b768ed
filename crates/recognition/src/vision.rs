//! The vision collaborator boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::item::ImageData;

/// Failure at the vision transport boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisionError {
    #[error("vision request timed out")]
    Timeout,

    #[error("vision service is rate limited")]
    RateLimited,

    #[error("vision transport failed: {0}")]
    Transport(String),

    #[error("vision response was malformed: {0}")]
    Malformed(String),
}

/// One object the vision collaborator saw on a shelf.
///
/// All fields except the name are best-effort; absent values get defaults
/// during normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfObservation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl ShelfObservation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
            count: None,
            confidence: None,
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_count(mut self, count: f64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Transport-agnostic client for the image-recognition collaborator.
///
/// `describe_item` returns loosely structured prose for a single held-up item;
/// `scan_shelf` returns one observation per object spotted in a shelf capture.
#[async_trait]
pub trait VisionClient: Send + Sync {
    async fn describe_item(&self, image: &ImageData) -> Result<String, VisionError>;

    async fn scan_shelf(&self, image: &ImageData) -> Result<Vec<ShelfObservation>, VisionError>;
}
