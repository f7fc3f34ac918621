//! Venue integration for the position feed.
//!
//! ## Hyperliquid testnet / Ventuals
//! Read-only access to a wallet's clearinghouse state on the `vntls`
//! builder dex:
//! - Open positions with size, leverage, and entry price
//! - Liquidation prices and unrealized PnL
//!
//! The `PositionSource` trait seams the venue away from the monitoring
//! engine; `mock` provides a scripted in-memory source for tests.

mod client;
pub mod mock;
mod traits;
mod types;

pub use client::VentualsClient;
pub use mock::MockPositionSource;
pub use traits::PositionSource;
pub use types::*;
