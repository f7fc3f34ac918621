//! Venue-agnostic seam for position feeds.

use async_trait::async_trait;

use crate::error::MonitorError;

use super::types::PositionSnapshot;

/// Read-only source of a wallet's open positions.
///
/// The monitoring engine needs exactly one operation from the venue;
/// implementing it is enough to point the monitor somewhere else (or at a
/// scripted source in tests).
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Fetch the wallet's currently open positions.
    ///
    /// A malformed address fails with [`MonitorError::InvalidAddress`]
    /// before any network traffic; venue trouble surfaces as
    /// [`MonitorError::SourceUnavailable`].
    async fn fetch_positions(&self, wallet: &str)
        -> Result<Vec<PositionSnapshot>, MonitorError>;
}
