//! Connectivity state and the active probe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use scanventory_core::{Notice, Notifier};

/// Connectivity state of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Online and connected to the backend.
    Online,
    /// Offline (network unreachable or backend unavailable).
    Offline,
    /// A sync pass is draining the offline queue.
    Syncing,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Online => "online",
            ConnectionStatus::Offline => "offline",
            ConnectionStatus::Syncing => "syncing",
        }
    }
}

/// Probe target and timeout for the connectivity monitor.
#[derive(Debug, Clone)]
pub struct ConnectivityConfig {
    pub probe_url: String,
    pub probe_timeout: Duration,
}

impl ConnectivityConfig {
    pub fn new(probe_url: impl Into<String>) -> Self {
        Self {
            probe_url: probe_url.into(),
            probe_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }
}

/// Tracks whether the client can reach the backend.
///
/// The status is last-known state, updated by the active probe, by ambient
/// signals from the host shell, and by the sync engine lifecycle. Only
/// online/offline flips notify the user; entering or leaving `Syncing` is
/// silent.
pub struct ConnectivityMonitor {
    config: ConnectivityConfig,
    status: Mutex<ConnectionStatus>,
    probe_in_flight: AtomicBool,
    client: reqwest::Client,
    notifier: std::sync::Arc<dyn Notifier>,
}

impl ConnectivityMonitor {
    pub fn new(config: ConnectivityConfig, notifier: std::sync::Arc<dyn Notifier>) -> Self {
        Self {
            config,
            status: Mutex::new(ConnectionStatus::Online),
            probe_in_flight: AtomicBool::new(false),
            client: reqwest::Client::new(),
            notifier,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        *self
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Last-known connectivity. `Syncing` counts as online.
    pub fn is_online(&self) -> bool {
        self.status() != ConnectionStatus::Offline
    }

    /// Probe the configured resource and update the status.
    ///
    /// If a probe is already in flight the cached status is returned without
    /// issuing a second request. Callers that need a fresh answer retry after
    /// the in-flight probe resolves.
    pub async fn check_connection(&self) -> bool {
        if self.probe_in_flight.swap(true, Ordering::SeqCst) {
            return self.is_online();
        }

        let online = self.probe().await;
        self.probe_in_flight.store(false, Ordering::SeqCst);

        self.set_status(if online {
            ConnectionStatus::Online
        } else {
            ConnectionStatus::Offline
        });
        online
    }

    /// Ambient signal from the host shell: the network came up.
    pub fn note_online(&self) {
        self.set_status(ConnectionStatus::Online);
    }

    /// Ambient signal from the host shell: the network went away.
    pub fn note_offline(&self) {
        self.set_status(ConnectionStatus::Offline);
    }

    /// Sync engine lifecycle: a sync pass started.
    pub fn begin_sync(&self) {
        self.set_status(ConnectionStatus::Syncing);
    }

    /// Sync engine lifecycle: the sync pass ended, online or not.
    pub fn finish_sync(&self, online: bool) {
        self.set_status(if online {
            ConnectionStatus::Online
        } else {
            ConnectionStatus::Offline
        });
    }

    async fn probe(&self) -> bool {
        self.client
            .head(&self.config.probe_url)
            .timeout(self.config.probe_timeout)
            .send()
            .await
            .is_ok()
    }

    fn set_status(&self, next: ConnectionStatus) {
        let previous = {
            let mut status = self
                .status
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *status, next)
        };
        if previous == next {
            return;
        }
        tracing::info!(from = previous.as_str(), to = next.as_str(), "connectivity changed");
        match (previous, next) {
            (ConnectionStatus::Online, ConnectionStatus::Offline) => {
                self.notifier.notify(Notice::warning(
                    "You're offline. Scans and counts will be queued and synced when the connection returns.",
                ));
            }
            (ConnectionStatus::Offline, ConnectionStatus::Online) => {
                self.notifier
                    .notify(Notice::info("Back online. Queued work is syncing."));
            }
            _ => {}
        }
    }
}

impl std::fmt::Debug for ConnectivityMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectivityMonitor")
            .field("config", &self.config)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
