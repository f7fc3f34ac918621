//! Poll loop and alert policy.
//!
//! One tick walks every subscriber: fetch positions, evaluate each open
//! position against the subscriber's threshold, alert on fresh breaches,
//! clear armed state on recovery, and drop state for closed positions.
//! Failures are contained per subscriber per tick; nothing in here ever
//! stops the loop or touches another subscriber's state.

use anyhow::Result;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::exchange::{PositionSnapshot, PositionSource};
use crate::notify::{format, Command, NotificationSink};
use crate::persistence::{StoredSubscriber, SubscriberStore};

use super::evaluator::evaluate;
use super::health::SourceHealth;
use super::registry::{PositionKey, Subscriber, SubscriberRegistry};

/// The monitoring service: owns the registry, drives poll cycles, and
/// answers chat commands.
pub struct MonitorEngine<S, N> {
    source: S,
    notifier: N,
    config: MonitorConfig,
    registry: RwLock<SubscriberRegistry>,
    health: RwLock<SourceHealth>,
    store: Option<Mutex<SubscriberStore>>,
}

impl<S, N> MonitorEngine<S, N>
where
    S: PositionSource,
    N: NotificationSink,
{
    pub fn new(source: S, notifier: N, config: MonitorConfig) -> Self {
        let health = SourceHealth::new(config.failure_alert_after);
        Self {
            source,
            notifier,
            config,
            registry: RwLock::new(SubscriberRegistry::new()),
            health: RwLock::new(health),
            store: None,
        }
    }

    /// Attach a registry store so registrations survive restarts.
    pub fn with_store(mut self, store: SubscriberStore) -> Self {
        self.store = Some(Mutex::new(store));
        self
    }

    pub async fn subscriber_count(&self) -> usize {
        self.registry.read().await.count()
    }

    /// Reload persisted registrations. Rows that no longer validate are
    /// skipped with a warning rather than failing startup.
    pub async fn restore_subscribers(&self) -> Result<usize> {
        let Some(store) = &self.store else {
            return Ok(0);
        };

        let rows = store.lock().await.load_all()?;
        let mut registry = self.registry.write().await;
        let mut restored = 0;

        for row in rows {
            match Subscriber::try_new(row.chat_id, &row.wallet, row.threshold) {
                Ok(mut subscriber) => {
                    subscriber.subscribed_at = row.subscribed_at;
                    registry.restore(subscriber);
                    restored += 1;
                }
                Err(err) => {
                    warn!(
                        chat_id = row.chat_id,
                        error = %err,
                        "Skipping invalid persisted subscriber"
                    );
                }
            }
        }

        info!(restored, "Subscribers restored from database");
        Ok(restored)
    }

    /// One poll cycle over a snapshot of the registry.
    pub async fn tick(&self) {
        let subscribers = self.registry.read().await.list_active();
        debug!(subscribers = subscribers.len(), "Poll cycle started");

        for subscriber in &subscribers {
            self.check_subscriber(subscriber).await;
        }
    }

    async fn check_subscriber(&self, subscriber: &Subscriber) {
        match self.source.fetch_positions(&subscriber.wallet).await {
            Ok(positions) => {
                let recovered = self
                    .health
                    .write()
                    .await
                    .record_success(subscriber.chat_id);
                if recovered {
                    info!(
                        chat_id = subscriber.chat_id,
                        wallet = %format::short_wallet(&subscriber.wallet),
                        "✅ Position source recovered"
                    );
                }

                let live: HashSet<PositionKey> = positions.iter().map(PositionKey::of).collect();
                for snapshot in &positions {
                    self.check_position(subscriber, snapshot).await;
                }
                self.registry
                    .write()
                    .await
                    .retain_armed(subscriber.chat_id, &live);
            }
            Err(MonitorError::SourceUnavailable(err)) => {
                debug!(chat_id = subscriber.chat_id, error = %err, "Fetch error detail");
                let notify_now = self.health.write().await.record_failure(subscriber.chat_id);
                if notify_now {
                    let text = format::source_trouble(
                        &subscriber.wallet,
                        self.config.failure_alert_after,
                    );
                    if let Err(err) = self.notifier.send_message(subscriber.chat_id, &text).await {
                        warn!(
                            chat_id = subscriber.chat_id,
                            error = %err,
                            "Trouble notice delivery failed"
                        );
                    }
                }
            }
            Err(err) => {
                error!(chat_id = subscriber.chat_id, error = %err, "Unexpected fetch error");
            }
        }
    }

    /// Evaluate one position and drive the armed-state machine: alert on a
    /// fresh breach (arming only once delivery succeeds), re-arm on
    /// recovery above the threshold.
    async fn check_position(&self, subscriber: &Subscriber, snapshot: &PositionSnapshot) {
        let Some(decision) = evaluate(snapshot, subscriber.threshold) else {
            return; // no liquidation level, nothing to measure
        };

        let key = PositionKey::of(snapshot);
        let armed = self.registry.read().await.is_armed(subscriber.chat_id, &key);

        if decision.breaching && !armed {
            let text = format::alert_message(snapshot, decision.distance);
            match self.notifier.send_message(subscriber.chat_id, &text).await {
                Ok(()) => {
                    self.registry
                        .write()
                        .await
                        .set_armed(subscriber.chat_id, &key, true);
                    info!(
                        chat_id = subscriber.chat_id,
                        position = %key,
                        distance = %decision.distance,
                        threshold = %subscriber.threshold,
                        "🚨 Liquidation alert delivered"
                    );
                }
                Err(err) => {
                    // Left unarmed; the alert is retried next cycle.
                    warn!(
                        chat_id = subscriber.chat_id,
                        position = %key,
                        error = %err,
                        "❌ Alert delivery failed"
                    );
                }
            }
        } else if !decision.breaching && armed {
            self.registry
                .write()
                .await
                .set_armed(subscriber.chat_id, &key, false);
            info!(
                chat_id = subscriber.chat_id,
                position = %key,
                distance = %decision.distance,
                "Position recovered above threshold"
            );
        }
    }

    /// Route an inbound chat command to its handler.
    pub async fn handle_command(&self, chat_id: i64, command: Command) -> Result<(), MonitorError> {
        match command {
            Command::Start { wallet, threshold } => {
                self.start_monitoring(chat_id, wallet, threshold).await
            }
            Command::Status => self.status_report(chat_id).await,
            Command::Stop => self.stop_monitoring(chat_id).await,
            Command::Help => self.reply(chat_id, format::help_text()).await,
            Command::List => self.list_subscribers(chat_id).await,
        }
    }

    async fn reply(&self, chat_id: i64, text: &str) -> Result<(), MonitorError> {
        self.notifier.send_message(chat_id, text).await
    }

    async fn start_monitoring(
        &self,
        chat_id: i64,
        wallet: Option<String>,
        threshold: Option<String>,
    ) -> Result<(), MonitorError> {
        let Some(wallet) = wallet else {
            return self.reply(chat_id, format::usage()).await;
        };

        let threshold = match threshold {
            None => self.config.default_threshold,
            Some(raw) => match Decimal::from_str(&raw) {
                Ok(value) => value,
                Err(_) => return self.reply(chat_id, format::invalid_threshold()).await,
            },
        };

        let outcome = self
            .registry
            .write()
            .await
            .subscribe(chat_id, &wallet, threshold);
        match outcome {
            Ok(()) => {}
            Err(MonitorError::InvalidAddress(_)) => {
                return self.reply(chat_id, format::invalid_address()).await;
            }
            Err(_) => {
                return self.reply(chat_id, format::invalid_threshold()).await;
            }
        }

        // Fresh wallet, fresh failure streak.
        self.health.write().await.clear(chat_id);
        self.persist(chat_id).await;

        let text = format::start_confirmation(&wallet, threshold, self.config.poll_interval_secs);
        self.reply(chat_id, &text).await
    }

    async fn stop_monitoring(&self, chat_id: i64) -> Result<(), MonitorError> {
        let removed = self.registry.write().await.unsubscribe(chat_id);
        if removed.is_none() {
            return self.reply(chat_id, format::not_monitored()).await;
        }

        self.health.write().await.clear(chat_id);
        if let Some(store) = &self.store {
            if let Err(err) = store.lock().await.remove(chat_id) {
                warn!(chat_id, error = %err, "Failed to remove persisted subscriber");
            }
        }

        self.reply(chat_id, format::stop_confirmation()).await
    }

    /// On-demand report. Read-only: never counts toward the failure
    /// streak and never touches armed state.
    async fn status_report(&self, chat_id: i64) -> Result<(), MonitorError> {
        let subscriber = self.registry.read().await.get(chat_id).cloned();
        let Some(subscriber) = subscriber else {
            return self.reply(chat_id, format::not_monitored()).await;
        };

        match self.source.fetch_positions(&subscriber.wallet).await {
            Ok(positions) => {
                let text =
                    format::status_message(&subscriber.wallet, subscriber.threshold, &positions);
                self.reply(chat_id, &text).await
            }
            Err(err) => {
                warn!(chat_id, error = %err, "Status fetch failed");
                self.reply(chat_id, format::source_retry()).await
            }
        }
    }

    async fn list_subscribers(&self, chat_id: i64) -> Result<(), MonitorError> {
        match self.config.admin_chat_id {
            Some(admin) if admin == chat_id => {
                let mut subscribers = self.registry.read().await.list_active();
                subscribers.sort_by_key(|s| s.chat_id);
                let text = format::subscriber_list(&subscribers);
                self.reply(chat_id, &text).await
            }
            _ => {
                debug!(chat_id, "Ignoring /list from non-admin chat");
                Ok(())
            }
        }
    }

    /// Mirror a registration into the store, if one is attached.
    async fn persist(&self, chat_id: i64) {
        let Some(store) = &self.store else {
            return;
        };

        let row = self.registry.read().await.get(chat_id).map(|s| StoredSubscriber {
            chat_id: s.chat_id,
            wallet: s.wallet.clone(),
            threshold: s.threshold,
            subscribed_at: s.subscribed_at,
        });
        let Some(row) = row else {
            return;
        };

        if let Err(err) = store.lock().await.upsert(&row) {
            warn!(chat_id, error = %err, "Failed to persist subscriber");
        }
    }
}
