//! `scanventory-catalog` — product catalog and inventory count records.
//!
//! **Responsibility:** the read-side product list fetched from the inventory
//! backend, name-based matching of recognized items against it, and the count
//! records that eventually land in stock levels.

pub mod catalog;
pub mod count;
pub mod product;

pub use catalog::ProductCatalog;
pub use count::{CountMethod, InventoryCount};
pub use product::{NewProduct, Product};
