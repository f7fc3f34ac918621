//! # Liquidation Sentinel
//!
//! A Telegram alert service watching leveraged Ventuals positions on the
//! Hyperliquid testnet and warning subscribers before liquidation.
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `exchange`: Hyperliquid info API client for the Ventuals builder dex
//! - `monitor`: Subscriber registry, distance evaluation, and the poll engine
//! - `notify`: Telegram Bot API client, command parsing, and message rendering
//! - `persistence`: SQLite-backed subscriber registrations
//! - `error`: Shared error type for monitoring operations

pub mod config;
pub mod error;
pub mod exchange;
pub mod monitor;
pub mod notify;
pub mod persistence;

pub use config::Config;
