//! Position source health tracking per subscriber.
//!
//! Counts consecutive fetch failures for each chat. When the streak
//! reaches the configured limit the caller is told to notify the
//! subscriber exactly once; any success resets the streak.

use std::collections::HashMap;
use tracing::{debug, warn};

/// Consecutive-failure counters, keyed by chat id.
#[derive(Debug)]
pub struct SourceHealth {
    alert_after: u32,
    failures: HashMap<i64, u32>,
}

impl SourceHealth {
    pub fn new(alert_after: u32) -> Self {
        Self {
            alert_after,
            failures: HashMap::new(),
        }
    }

    /// Record a failed fetch. Returns `true` exactly when the streak
    /// hits the limit, so the caller sends one trouble notice per streak.
    pub fn record_failure(&mut self, chat_id: i64) -> bool {
        let count = self.failures.entry(chat_id).or_insert(0);
        *count += 1;

        warn!(
            chat_id,
            consecutive_failures = *count,
            alert_after = self.alert_after,
            "Position source fetch failed"
        );
        *count == self.alert_after
    }

    /// Record a successful fetch. Returns `true` if this ended a streak
    /// the subscriber was already notified about.
    pub fn record_success(&mut self, chat_id: i64) -> bool {
        match self.failures.remove(&chat_id) {
            Some(count) if count >= self.alert_after => {
                debug!(chat_id, "Position source recovered after notified outage");
                true
            }
            Some(_) => false,
            None => false,
        }
    }

    pub fn failure_count(&self, chat_id: i64) -> u32 {
        self.failures.get(&chat_id).copied().unwrap_or(0)
    }

    /// Forget a chat entirely (used when a subscriber stops).
    pub fn clear(&mut self, chat_id: i64) {
        self.failures.remove(&chat_id);
    }
}
