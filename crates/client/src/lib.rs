//! Client-facing operations for the scan-and-sync flow.
//!
//! **Responsibility:** wire the injected collaborators into a
//! [`ScanContext`] and expose the operations a capture UI calls: analyze a
//! scan (or queue it offline), commit reviewed counts, register unknown
//! products, and run the delayed selection advance.

pub mod advance;
pub mod commit;
pub mod context;
pub mod scan;

pub use advance::{AutoAdvanceTimer, DEFAULT_ADVANCE_DELAY};
pub use commit::{CommitError, CommitOutcome, commit_counts, register_product};
pub use context::ScanContext;
pub use scan::{ScanOutcome, analyze};
