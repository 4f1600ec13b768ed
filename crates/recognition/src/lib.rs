//! `scanventory-recognition`
//!
//! **Responsibility:** the image-recognition boundary.
//!
//! This crate turns captured images into recognized inventory items:
//! - It talks to the vision collaborator only through the [`VisionClient`]
//!   trait; transports live in `scanventory-infra`.
//! - It owns the tolerant text parser for single-item descriptions and the
//!   normalization of shelf observations.
//! - It matches recognized names against the product catalog, but never
//!   mutates inventory state.

pub mod analyze;
pub mod item;
pub mod parser;
pub mod vision;

pub use analyze::{Analysis, AnalysisError, analyze_image};
pub use item::{DEFAULT_CONFIDENCE, ImageData, RecognizedItem, ScanMode};
pub use parser::{ParsedItem, parse_single_item_text};
pub use vision::{ShelfObservation, VisionClient, VisionError};
