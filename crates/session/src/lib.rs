//! `scanventory-session` — the active scan review session.
//!
//! **Responsibility:** hold the recognized items currently under review,
//! track the selection, and keep the undo history that makes every edit
//! reversible. Session state is transient: it lives for one scan and is
//! discarded on reset, never persisted.

pub mod session;

pub use session::{HistoryEntry, ScanSession, SessionError, UndoneAction, UpdateOutcome};
