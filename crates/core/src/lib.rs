//! `scanventory-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the fixed-point quantity used for counts, the domain error
//! model and the user-notification seam.

pub mod error;
pub mod id;
pub mod notify;
pub mod quantity;

pub use error::{DomainError, DomainResult};
pub use id::{CountId, ProductId, RequestId};
pub use notify::{Notice, Notifier, RecordingNotifier, Severity, TracingNotifier};
pub use quantity::Quantity;
