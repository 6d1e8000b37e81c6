//! Wallet sync tracking.
//!
//! The daemon only assembles transactions once its UTXO view has caught up
//! with a synced node. [`SyncState`] records that condition; the background
//! loop from [`spawn_sync_loop`] keeps it current.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::server::WalletServer;

/// Point-in-time view of the sync tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStatus {
    pub synced: bool,
    /// Successful refreshes since startup.
    pub refreshes: u64,
    /// Reason the wallet last dropped out of sync, if it did.
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
pub struct SyncState {
    inner: RwLock<SyncStatus>,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_synced(&self) -> bool {
        self.inner.read().synced
    }

    pub fn mark_synced(&self) {
        let mut status = self.inner.write();
        status.synced = true;
        status.refreshes += 1;
        status.last_error = None;
    }

    pub fn mark_unsynced(&self, reason: impl Into<String>) {
        let mut status = self.inner.write();
        status.synced = false;
        status.last_error = Some(reason.into());
    }

    pub fn status(&self) -> SyncStatus {
        self.inner.read().clone()
    }
}

/// Run [`WalletServer::sync_once`] every `interval` until the task is aborted.
pub fn spawn_sync_loop(server: Arc<WalletServer>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match server.sync_once().await {
                Ok(()) => debug!("wallet sync complete"),
                Err(e) => warn!(error = %e, "wallet sync failed"),
            }
        }
    })
}
