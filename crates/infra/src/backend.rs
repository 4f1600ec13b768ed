//! The inventory backend seam.

use async_trait::async_trait;
use thiserror::Error;

use scanventory_catalog::{InventoryCount, NewProduct, Product};

/// Failure talking to the inventory backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Network(String),

    #[error("backend request timed out")]
    Timeout,

    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("requested resource was not found")]
    NotFound,

    #[error("backend response could not be parsed: {0}")]
    Parse(String),
}

impl BackendError {
    /// Whether retrying later, without changing the request, can succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Network(_) | BackendError::Timeout => true,
            BackendError::Api { status, .. } => *status >= 500,
            BackendError::NotFound | BackendError::Parse(_) => false,
        }
    }
}

/// What the client needs from the inventory backend.
///
/// `insert_counts` is all-or-nothing: either every count in the batch is
/// accepted or the call fails and none may be treated as submitted.
#[async_trait]
pub trait InventoryBackend: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;

    async fn create_product(&self, new_product: NewProduct) -> Result<Product, BackendError>;

    async fn insert_counts(&self, counts: &[InventoryCount]) -> Result<(), BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_failures_are_retryable() {
        assert!(BackendError::Timeout.is_retryable());
        assert!(BackendError::Network("refused".into()).is_retryable());
        assert!(BackendError::Api { status: 503, message: "down".into() }.is_retryable());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        assert!(!BackendError::NotFound.is_retryable());
        assert!(!BackendError::Api { status: 400, message: "bad".into() }.is_retryable());
        assert!(!BackendError::Parse("truncated".into()).is_retryable());
    }
}
