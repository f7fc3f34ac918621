//! Scripted position source for engine tests and dry runs.

use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::MonitorError;

use super::traits::PositionSource;
use super::types::PositionSnapshot;

/// In-memory source returning whatever positions were scripted per wallet.
///
/// Wallets can be marked unavailable to simulate venue outages; fetches for
/// them fail with `SourceUnavailable` until the wallet is restored. Clones
/// share the underlying script, so a test can keep a handle after handing
/// the source to the engine.
#[derive(Clone, Default)]
pub struct MockPositionSource {
    positions: Arc<RwLock<HashMap<String, Vec<PositionSnapshot>>>>,
    unavailable: Arc<RwLock<HashSet<String>>>,
    calls: Arc<AtomicU32>,
}

impl MockPositionSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the positions returned for a wallet.
    pub async fn set_positions(&self, wallet: &str, positions: Vec<PositionSnapshot>) {
        self.positions
            .write()
            .await
            .insert(wallet.to_string(), positions);
    }

    /// Make fetches for a wallet fail with a source error.
    pub async fn set_unavailable(&self, wallet: &str) {
        self.unavailable.write().await.insert(wallet.to_string());
    }

    /// Restore successful fetches for a wallet.
    pub async fn set_available(&self, wallet: &str) {
        self.unavailable.write().await.remove(wallet);
    }

    /// Number of fetches performed so far.
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PositionSource for MockPositionSource {
    async fn fetch_positions(
        &self,
        wallet: &str,
    ) -> Result<Vec<PositionSnapshot>, MonitorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.read().await.contains(wallet) {
            return Err(MonitorError::SourceUnavailable(anyhow!(
                "scripted outage for {wallet}"
            )));
        }

        Ok(self
            .positions
            .read()
            .await
            .get(wallet)
            .cloned()
            .unwrap_or_default())
    }
}
