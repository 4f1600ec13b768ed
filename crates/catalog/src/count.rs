//! Inventory count records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use scanventory_core::{CountId, ProductId, Quantity};

/// How a count was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountMethod {
    Camera,
    Video,
    Manual,
}

impl CountMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountMethod::Camera => "camera",
            CountMethod::Video => "video",
            CountMethod::Manual => "manual",
        }
    }
}

/// A finalized stock count for one product.
///
/// The id is minted locally (UUIDv7) so a count keeps its identity across the
/// offline queue and the eventual backend submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryCount {
    pub id: CountId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub counted_at: DateTime<Utc>,
    pub method: CountMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl InventoryCount {
    pub fn new(product_id: ProductId, quantity: Quantity, method: CountMethod) -> Self {
        Self {
            id: CountId::new(),
            product_id,
            quantity,
            counted_at: Utc::now(),
            method,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_get_distinct_local_ids() {
        let a = InventoryCount::new(ProductId::new("p1"), Quantity::ONE, CountMethod::Camera);
        let b = InventoryCount::new(ProductId::new("p1"), Quantity::ONE, CountMethod::Camera);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn count_method_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&CountMethod::Camera).unwrap(), "\"camera\"");
        assert_eq!(CountMethod::Manual.as_str(), "manual");
    }

    #[test]
    fn count_json_round_trips() {
        let count = InventoryCount::new(
            ProductId::new("p7"),
            Quantity::from_tenths(25),
            CountMethod::Video,
        )
        .with_notes("half-empty case");
        let json = serde_json::to_string(&count).unwrap();
        let back: InventoryCount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, count);
    }
}
