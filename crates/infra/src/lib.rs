//! `scanventory-infra` — transports and test doubles.
//!
//! **Responsibility:** concrete implementations of the outward-facing seams:
//! the inventory backend (HTTP and in-memory) and the vision collaborator
//! (HTTP and scripted). Nothing in here owns domain rules; it moves domain
//! types across the network and maps transport failures onto the domain's
//! error vocabulary.

pub mod backend;
pub mod http_backend;
pub mod in_memory_backend;
pub mod vision_http;
pub mod vision_scripted;

pub use backend::{BackendError, InventoryBackend};
pub use http_backend::HttpBackend;
pub use in_memory_backend::InMemoryBackend;
pub use vision_http::HttpVisionClient;
pub use vision_scripted::{ScriptedResponse, ScriptedVisionClient};
