//! Domain errors for the monitoring pipeline.

use thiserror::Error;

/// Failures the monitoring pipeline distinguishes between.
///
/// The first two are rejected locally before any network traffic; the last
/// two wrap transport-level causes and are handled without dropping the
/// affected subscriber.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Wallet address is not `0x` followed by 40 hex characters.
    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),

    /// Threshold is zero, negative, or not a number.
    #[error("invalid threshold: {0}")]
    InvalidThreshold(String),

    /// The venue could not be reached or returned an unusable response.
    #[error("position source unavailable")]
    SourceUnavailable(#[source] anyhow::Error),

    /// Telegram rejected or failed to deliver a message.
    #[error("message delivery failed")]
    DeliveryFailure(#[source] anyhow::Error),
}
