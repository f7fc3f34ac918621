//! Liquidation Sentinel - Main Entry Point
//!
//! Telegram-driven liquidation alerts for Ventuals positions on the
//! Hyperliquid testnet.

use anyhow::Result;
use clap::{Parser, Subcommand};
use liquidation_sentinel::config::Config;
use liquidation_sentinel::exchange::VentualsClient;
use liquidation_sentinel::monitor::MonitorEngine;
use liquidation_sentinel::notify::{Command, TelegramNotifier};
use liquidation_sentinel::persistence::SubscriberStore;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Liquidation Sentinel CLI
#[derive(Parser)]
#[command(name = "liquidation-sentinel")]
#[command(version, about = "Liquidation alerts for Ventuals positions on Hyperliquid testnet")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show registered subscribers from the database
    Status {
        /// Path to SQLite database (default: data/subscribers.db)
        #[arg(short, long, default_value = "data/subscribers.db")]
        db: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize comprehensive logging
    init_logging()?;

    // Handle subcommands
    if let Some(Commands::Status { db }) = cli.command {
        return show_status(&db);
    }

    info!("╔════════════════════════════════════════════════════════════╗");
    info!(
        "║       Liquidation Sentinel v{} - Ventuals Testnet       ║",
        env!("CARGO_PKG_VERSION")
    );
    info!("╚════════════════════════════════════════════════════════════╝");

    // Load configuration
    let config = Config::load()?;
    config.validate()?;
    log_config(&config);

    // The bot token comes from the environment or config file and is
    // never written to logs or echoed back.
    let token = std::env::var("TELEGRAM_BOT_TOKEN")
        .ok()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| config.telegram.bot_token.clone());
    anyhow::ensure!(
        !token.is_empty(),
        "Telegram bot token missing: set TELEGRAM_BOT_TOKEN or telegram.bot_token"
    );

    // Initialize SQLite persistence for subscriber registrations
    if let Some(parent) = Path::new(&config.monitor.db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = SubscriberStore::new(&config.monitor.db_path)?;

    // Initialize clients
    let client = VentualsClient::new(&config.venue)?;
    let notifier = TelegramNotifier::new(&config.telegram, &token)?;
    let poller = notifier.clone();

    let engine = Arc::new(
        MonitorEngine::new(client, notifier, config.monitor.clone()).with_store(store),
    );

    // Restore previous registrations
    let restored = engine.restore_subscribers().await?;
    if restored > 0 {
        info!("📂 [PERSISTENCE] Restored {} subscriber(s) from database", restored);
    } else {
        info!("📂 [PERSISTENCE] No previous subscribers found, starting fresh");
    }

    // Shutdown signal
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("🛑 Shutdown signal received");
        shutdown_clone.store(true, Ordering::SeqCst);
    });

    // Poll loop: check every subscriber's positions on a fixed cadence
    let poll_engine = engine.clone();
    let poll_shutdown = shutdown.clone();
    let poll_interval = Duration::from_secs(config.monitor.poll_interval_secs);
    let monitor_task = tokio::spawn(async move {
        while !poll_shutdown.load(Ordering::SeqCst) {
            poll_engine.tick().await;
            tokio::time::sleep(poll_interval).await;
        }
    });

    info!("🚀 Starting Telegram command loop...");
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Command loop: long-poll getUpdates and route commands to the engine
    let mut offset = 0i64;
    while !shutdown.load(Ordering::SeqCst) {
        match poller.get_updates(offset).await {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);

                    let Some(message) = update.message else { continue };
                    let Some(text) = message.text else { continue };
                    let Some(command) = Command::parse(&text) else { continue };

                    debug!(chat_id = message.chat.id, ?command, "Command received");
                    if let Err(e) = engine.handle_command(message.chat.id, command).await {
                        warn!(chat_id = message.chat.id, error = %e, "Command handling failed");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "getUpdates failed, backing off");
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
        }
    }

    monitor_task.abort();
    info!("👋 Liquidation Sentinel shutdown complete");
    Ok(())
}

/// Initialize comprehensive logging with file output.
fn init_logging() -> Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    // Create logs directory
    std::fs::create_dir_all("logs")?;

    // File appender for detailed logs
    let file_appender = tracing_appender::rolling::hourly("logs", "liquidation-sentinel.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    // Leak the guard to keep it alive for the program duration
    Box::leak(Box::new(_guard));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("liquidation_sentinel=debug".parse()?)
                .add_directive(Level::INFO.into()),
        )
        .with_writer(std::io::stdout.and(file_writer))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .init();

    Ok(())
}

/// Log configuration on startup. The bot token is deliberately absent.
fn log_config(config: &Config) {
    info!("📋 Configuration:");
    info!("   Poll Interval: {}s", config.monitor.poll_interval_secs);
    info!("   Default Threshold: ${}", config.monitor.default_threshold);
    info!(
        "   Failure Alert After: {} consecutive misses",
        config.monitor.failure_alert_after
    );
    info!("   Database: {}", config.monitor.db_path);
    info!("   Venue: {} (dex: {})", config.venue.api_url, config.venue.dex);
    info!(
        "   Telegram Poll Timeout: {}s",
        config.telegram.poll_timeout_secs
    );
    match config.monitor.admin_chat_id {
        Some(chat_id) => info!("   Admin Chat: {}", chat_id),
        None => info!("   Admin Chat: disabled"),
    }
}

/// Show registered subscribers from the database.
fn show_status(db_path: &str) -> Result<()> {
    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║            LIQUIDATION SENTINEL SUBSCRIBERS                ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    if !Path::new(db_path).exists() {
        println!("\n❌ Database not found: {}", db_path);
        println!("   The sentinel has not been started yet, or the database path is incorrect.");
        return Ok(());
    }

    let store = SubscriberStore::new(db_path)?;
    let subscribers = store.load_all()?;

    if subscribers.is_empty() {
        println!("\n📋 No subscribers registered.");
        return Ok(());
    }

    println!("\n📋 {} subscriber(s)", subscribers.len());
    for subscriber in &subscribers {
        println!("   ┌─ Chat {}", subscriber.chat_id);
        println!("   ├─ Wallet:     {}", subscriber.wallet);
        println!("   ├─ Threshold:  ${:.2}", subscriber.threshold);
        println!(
            "   └─ Subscribed: {}",
            subscriber.subscribed_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    println!();
    Ok(())
}
