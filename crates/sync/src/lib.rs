//! Connectivity tracking and offline-queue replay.
//!
//! **Responsibility:** know whether the backend is reachable, tell the user
//! when that changes, and drain the offline queue through the normal
//! analysis and commit paths once it is.

pub mod connectivity;
pub mod engine;

pub use connectivity::{ConnectionStatus, ConnectivityConfig, ConnectivityMonitor};
pub use engine::{SyncEngine, SyncError, SyncReport};
