//! Tolerant parser for single-item vision descriptions.
//!
//! The vision collaborator answers in loosely structured prose:
//!
//! ```text
//! Item 1: Jasmine Rice
//! Size: 5lb bag
//! Quantity: 2
//! Confidence: 87%
//! ```
//!
//! Marker spellings drift between responses ("Product name:", "Qty:",
//! "count:"), numbers arrive as "2", "2.5" or "x3", and confidence shows up
//! as a fraction or a percentage. The parser accepts all of it and never
//! fails: unusable text simply yields no items, which callers surface as an
//! unrecognizable capture rather than a crash.

use std::sync::LazyLock;

use regex::Regex;

use crate::item::{DEFAULT_CONFIDENCE, RecognizedItem};
use scanventory_core::Quantity;

/// `Item 3:` / `item 3.` boundary, capturing any trailing text on the line.
static ITEM_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^item\s+\d+\s*[:.]\s*(.*)$").unwrap());

/// `key: value` field line. Longer key spellings come first so
/// "product name" is not eaten by "product".
static FIELD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(product\s+name|product|name|size|unit|quantity|qty|count|confidence)\s*[:=]\s*(.*)$")
        .unwrap()
});

/// First numeric token in a value, e.g. the `3` in "x3 bags".
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

/// One item extracted from a description.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedItem {
    pub name: String,
    pub size: Option<String>,
    pub quantity: Quantity,
    pub confidence: f32,
}

impl From<ParsedItem> for RecognizedItem {
    fn from(parsed: ParsedItem) -> Self {
        let mut item = RecognizedItem::new(parsed.name)
            .with_quantity(parsed.quantity)
            .with_confidence(parsed.confidence);
        if let Some(size) = parsed.size {
            item = item.with_size(size);
        }
        item
    }
}

/// Fields collected for the item currently being read.
#[derive(Debug, Default)]
struct PendingFields {
    name: Option<String>,
    size: Option<String>,
    quantity: Option<Quantity>,
    confidence: Option<f32>,
}

impl PendingFields {
    /// Emit the collected item, if it has a name. Fields without a name are
    /// dropped. Missing quantity defaults to 1, missing confidence to
    /// [`DEFAULT_CONFIDENCE`].
    fn flush(&mut self) -> Option<ParsedItem> {
        let fields = std::mem::take(self);
        let name = fields.name?;
        Some(ParsedItem {
            name,
            size: fields.size,
            quantity: fields.quantity.unwrap_or(Quantity::ONE),
            confidence: fields.confidence.unwrap_or(DEFAULT_CONFIDENCE),
        })
    }
}

/// Parse a single-item description into zero or more items.
///
/// Items are segmented on blank lines or explicit `item N:` markers. Lines
/// that are neither markers nor known fields are surrounding prose and are
/// skipped. A trailing item that has a name is emitted even without a closing
/// blank line.
pub fn parse_single_item_text(text: &str) -> Vec<ParsedItem> {
    let mut items = Vec::new();
    let mut current = PendingFields::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            items.extend(current.flush());
            continue;
        }
        if let Some(caps) = ITEM_MARKER.captures(line) {
            items.extend(current.flush());
            let rest = caps[1].trim();
            // "Item 1: Jasmine Rice" names the item inline.
            if !rest.is_empty() && !apply_field(&mut current, rest) {
                current.name = Some(rest.to_string());
            }
            continue;
        }
        apply_field(&mut current, line);
    }
    items.extend(current.flush());

    tracing::debug!(items = items.len(), "parsed single-item description");
    items
}

/// Apply a `key: value` line to the current item. Returns false if the line
/// is not a recognized field.
fn apply_field(current: &mut PendingFields, line: &str) -> bool {
    let Some(caps) = FIELD_LINE.captures(line) else {
        return false;
    };
    let key = caps[1].to_lowercase();
    let key = key.split_whitespace().collect::<Vec<_>>().join(" ");
    let value = caps[2].trim();

    match key.as_str() {
        "product name" | "product" | "name" => {
            if !value.is_empty() {
                current.name = Some(value.to_string());
            }
        }
        "size" | "unit" => {
            if !value.is_empty() {
                current.size = Some(value.to_string());
            }
        }
        "quantity" | "qty" | "count" => {
            current.quantity = leading_number(value).and_then(|n| Quantity::from_f64(n).ok());
        }
        "confidence" => {
            current.confidence = leading_number(value).map(|n| {
                // "87%" and a bare "87" both mean 0.87.
                let n = if value.contains('%') || n > 1.0 { n / 100.0 } else { n };
                (n as f32).clamp(0.0, 1.0)
            });
        }
        _ => return false,
    }
    true
}

fn leading_number(value: &str) -> Option<f64> {
    NUMBER.find(value)?.as_str().parse().ok()
}
