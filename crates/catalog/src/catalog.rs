//! In-memory product catalog with name-based matching.

use serde::{Deserialize, Serialize};

use crate::product::Product;
use scanventory_core::ProductId;

/// The product list fetched from the backend, held in fetch order.
///
/// Matching is deliberately forgiving: vision output says "a bag of jasmine
/// rice" while the catalog says "Jasmine Rice 5lb", and either side may be the
/// longer one. A resolved match links the recognized item to a real product id
/// so its count can land against stock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Add a freshly registered product without refetching the whole list.
    pub fn add(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Match a recognized name against the catalog.
    ///
    /// Case-insensitive substring match in both directions; the first catalog
    /// entry (in fetch order) that matches wins. Empty names on either side
    /// never match.
    pub fn resolve(&self, name: &str) -> Option<&Product> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.products.iter().find(|product| {
            let candidate = product.name.trim().to_lowercase();
            !candidate.is_empty() && (candidate.contains(&needle) || needle.contains(&candidate))
        })
    }
}

impl From<Vec<Product>> for ProductCatalog {
    fn from(products: Vec<Product>) -> Self {
        Self::new(products)
    }
}
