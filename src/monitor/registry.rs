//! Subscriber registry and per-position armed state.
//!
//! Tracks who is monitored and which positions have already alerted:
//! - One registration per chat; the latest `/start` wins
//! - Armed flags are keyed by (symbol, side), set when an alert goes out,
//!   and cleared when the distance recovers above the threshold
//! - A closed position drops its armed entry entirely, so a re-opened
//!   breach alerts again

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, info};

use crate::error::MonitorError;
use crate::exchange::{is_valid_address, PositionSide, PositionSnapshot};

/// Identity of a position within one wallet: symbol plus direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionKey {
    pub coin: String,
    pub side: PositionSide,
}

impl PositionKey {
    /// Key for a snapshot.
    pub fn of(snapshot: &PositionSnapshot) -> Self {
        Self {
            coin: snapshot.coin.clone(),
            side: snapshot.side,
        }
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.coin, self.side)
    }
}

/// A monitored chat: wallet, threshold, and alert state.
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub chat_id: i64,
    pub wallet: String,
    /// Alert when a position's distance is at or below this (quote currency).
    pub threshold: Decimal,
    pub subscribed_at: DateTime<Utc>,
    /// Alert state per open position. `true` = already alerted, waiting
    /// for recovery; absent = never breached (or position closed since).
    armed: HashMap<PositionKey, bool>,
}

impl Subscriber {
    /// Validate and build a fresh registration.
    pub fn try_new(chat_id: i64, wallet: &str, threshold: Decimal) -> Result<Self, MonitorError> {
        if !is_valid_address(wallet) {
            return Err(MonitorError::InvalidAddress(wallet.to_string()));
        }
        if threshold <= Decimal::ZERO {
            return Err(MonitorError::InvalidThreshold(threshold.to_string()));
        }

        Ok(Self {
            chat_id,
            wallet: wallet.to_string(),
            threshold,
            subscribed_at: Utc::now(),
            armed: HashMap::new(),
        })
    }
}

/// All monitored chats, keyed by chat id.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    subscribers: HashMap<i64, Subscriber>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chat. The latest registration wins; any previous armed
    /// state for the chat is discarded.
    pub fn subscribe(
        &mut self,
        chat_id: i64,
        wallet: &str,
        threshold: Decimal,
    ) -> Result<(), MonitorError> {
        let subscriber = Subscriber::try_new(chat_id, wallet, threshold)?;
        let replaced = self.subscribers.insert(chat_id, subscriber).is_some();

        info!(
            chat_id,
            wallet = %wallet,
            threshold = %threshold,
            replaced,
            "Subscriber registered"
        );
        Ok(())
    }

    /// Re-insert a previously persisted registration as-is.
    pub fn restore(&mut self, subscriber: Subscriber) {
        self.subscribers.insert(subscriber.chat_id, subscriber);
    }

    /// Remove a registration, returning it if one existed.
    pub fn unsubscribe(&mut self, chat_id: i64) -> Option<Subscriber> {
        let removed = self.subscribers.remove(&chat_id);
        if removed.is_some() {
            info!(chat_id, "Subscriber removed");
        }
        removed
    }

    pub fn get(&self, chat_id: i64) -> Option<&Subscriber> {
        self.subscribers.get(&chat_id)
    }

    /// Snapshot of all subscribers for one poll cycle.
    pub fn list_active(&self) -> Vec<Subscriber> {
        self.subscribers.values().cloned().collect()
    }

    /// Whether an alert has already been sent for this position.
    pub fn is_armed(&self, chat_id: i64, key: &PositionKey) -> bool {
        self.subscribers
            .get(&chat_id)
            .and_then(|s| s.armed.get(key).copied())
            .unwrap_or(false)
    }

    pub fn set_armed(&mut self, chat_id: i64, key: &PositionKey, armed: bool) {
        if let Some(subscriber) = self.subscribers.get_mut(&chat_id) {
            subscriber.armed.insert(key.clone(), armed);
            debug!(chat_id, key = %key, armed, "Armed state updated");
        }
    }

    /// Drop armed entries for positions that are no longer open.
    pub fn retain_armed(&mut self, chat_id: i64, live: &HashSet<PositionKey>) {
        if let Some(subscriber) = self.subscribers.get_mut(&chat_id) {
            subscriber.armed.retain(|key, _| live.contains(key));
        }
    }

    pub fn count(&self) -> usize {
        self.subscribers.len()
    }
}
