//! In-memory [`InventoryBackend`] for tests/dev.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;

use scanventory_catalog::{InventoryCount, NewProduct, Product};
use scanventory_core::ProductId;

use crate::backend::{BackendError, InventoryBackend};

/// Backend double that keeps everything in process memory.
///
/// `fail_next_call` arms a one-shot network failure so callers can exercise
/// their retry paths. The failure fires before any state changes, which keeps
/// the batch-insert contract (all or nothing) honest.
#[derive(Debug)]
pub struct InMemoryBackend {
    products: Mutex<Vec<Product>>,
    counts: Mutex<Vec<InventoryCount>>,
    next_id: AtomicU64,
    fail_next: AtomicBool,
    fail_next_insert: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::with_products(Vec::new())
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        let next_id = products.len() as u64 + 1;
        Self {
            products: Mutex::new(products),
            counts: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(next_id),
            fail_next: AtomicBool::new(false),
            fail_next_insert: AtomicBool::new(false),
        }
    }

    /// Make the next backend call fail with a network error.
    pub fn fail_next_call(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Make only the next `insert_counts` call fail, leaving reads working.
    pub fn fail_next_insert(&self) {
        self.fail_next_insert.store(true, Ordering::SeqCst);
    }

    pub fn inserted_counts(&self) -> Vec<InventoryCount> {
        self.counts.lock().unwrap().clone()
    }

    fn take_failure(&self) -> Result<(), BackendError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(BackendError::Network("injected failure".into()));
        }
        Ok(())
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventoryBackend for InMemoryBackend {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        self.take_failure()?;
        Ok(self.products.lock().unwrap().clone())
    }

    async fn create_product(&self, new_product: NewProduct) -> Result<Product, BackendError> {
        self.take_failure()?;
        let id = ProductId::new(format!("p{}", self.next_id.fetch_add(1, Ordering::SeqCst)));
        let mut product = Product::new(id, new_product.name);
        product.unit = new_product.unit;
        product.category = new_product.category;
        self.products.lock().unwrap().push(product.clone());
        Ok(product)
    }

    async fn insert_counts(&self, counts: &[InventoryCount]) -> Result<(), BackendError> {
        self.take_failure()?;
        if self.fail_next_insert.swap(false, Ordering::SeqCst) {
            return Err(BackendError::Network("injected insert failure".into()));
        }
        self.counts.lock().unwrap().extend_from_slice(counts);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanventory_catalog::CountMethod;
    use scanventory_core::Quantity;

    #[tokio::test]
    async fn created_products_get_sequential_ids() {
        let backend = InMemoryBackend::new();
        let a = backend
            .create_product(NewProduct::new("Olive Oil").unwrap())
            .await
            .unwrap();
        let b = backend
            .create_product(NewProduct::new("Flour").unwrap())
            .await
            .unwrap();
        assert_eq!(a.id.as_str(), "p1");
        assert_eq!(b.id.as_str(), "p2");
        assert_eq!(backend.list_products().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn armed_failure_fires_once_and_changes_nothing() {
        let backend = InMemoryBackend::new();
        backend.fail_next_call();

        let counts = vec![InventoryCount::new(
            ProductId::new("p1"),
            Quantity::ONE,
            CountMethod::Manual,
        )];
        let err = backend.insert_counts(&counts).await.unwrap_err();
        assert!(matches!(err, BackendError::Network(_)));
        assert!(backend.inserted_counts().is_empty());

        backend.insert_counts(&counts).await.unwrap();
        assert_eq!(backend.inserted_counts().len(), 1);
    }

    #[tokio::test]
    async fn seeded_products_continue_the_id_sequence() {
        let seeded = Product::new(ProductId::new("p1"), "Salt");
        let backend = InMemoryBackend::with_products(vec![seeded]);
        let created = backend
            .create_product(NewProduct::new("Pepper").unwrap())
            .await
            .unwrap();
        assert_eq!(created.id.as_str(), "p2");
    }
}
