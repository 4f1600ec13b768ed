//! User-facing notification channel.
//!
//! **Responsibility:** carry short, actionable status messages ("you are
//! offline, counts will sync later") from the domain out to whatever surface
//! hosts it, without the domain knowing about that surface.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// How loudly a notice should be surfaced.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A single user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { severity: Severity::Info, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: message.into() }
    }
}

/// Sink for user-visible notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that forwards notices to the tracing pipeline.
///
/// Useful for headless runs where no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => tracing::info!(notice = %notice.message, "user notice"),
            Severity::Warning => tracing::warn!(notice = %notice.message, "user notice"),
            Severity::Error => tracing::error!(notice = %notice.message, "user notice"),
        }
    }
}

/// Notifier that records notices in memory. Intended for tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    inner: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notice> {
        self.inner.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.all().into_iter().map(|n| n.message).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.inner.lock().unwrap().push(notice);
    }
}
