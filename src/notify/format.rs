//! Message rendering for alerts, status reports, and command replies.
//!
//! All texts use Telegram's legacy Markdown (`parse_mode: "Markdown"`):
//! single `*` for bold, backticks for monospace. Prices render with 4
//! decimals, money amounts with 2; the alert distance is passed in
//! pre-rounded so the displayed figure is the one that was compared
//! against the threshold.

use rust_decimal::Decimal;

use crate::exchange::PositionSnapshot;
use crate::monitor::{distance_to_liquidation, Subscriber};

/// Status classification for one position's distance to liquidation.
/// `None` means the venue reports no liquidation level.
pub fn distance_marker(distance: Option<Decimal>, threshold: Decimal) -> &'static str {
    match distance {
        None => "🟢",
        Some(d) if d > threshold => "🟢",
        Some(d) if d > threshold / Decimal::TWO => "🟡",
        Some(_) => "🔴",
    }
}

/// Abbreviate a wallet address for log lines and notices.
pub fn short_wallet(wallet: &str) -> String {
    match (wallet.get(..6), wallet.get(wallet.len().saturating_sub(4)..)) {
        (Some(head), Some(tail)) if wallet.len() > 12 => format!("{head}...{tail}"),
        _ => wallet.to_string(),
    }
}

/// The liquidation alert. Carries every field subscribers rely on:
/// symbol, side, size, leverage and margin mode, entry/current/liquidation
/// prices, the compared distance, and unrealized PnL.
pub fn alert_message(snapshot: &PositionSnapshot, distance: Decimal) -> String {
    let mut message = String::from("🚨 *LIQUIDATION ALERT* 🚨\n\n");

    message.push_str(&format!("*Position:* {}\n", snapshot.coin));
    message.push_str(&format!("*Side:* {}\n", snapshot.side));
    message.push_str(&format!("*Size:* {}\n", snapshot.size));
    message.push_str(&format!(
        "*Leverage:* {}x ({})\n",
        snapshot.leverage, snapshot.margin_mode
    ));
    if let Some(entry) = snapshot.entry_price {
        message.push_str(&format!("*Entry Price:* ${:.4}\n", entry));
        message.push_str(&format!("*Entry Value:* ${:.2}\n", entry * snapshot.size.abs()));
    }
    message.push_str(&format!("*Current Price:* ${:.4}\n", snapshot.mark_price));
    message.push_str(&format!("*Current Value:* ${:.2}\n", snapshot.position_value));
    if let Some(liquidation) = snapshot.liquidation_price {
        message.push_str(&format!("*Liquidation Price:* ${:.4}\n", liquidation));
    }

    message.push_str(&format!("\n⚠️ *Distance to Liquidation:* ${:.2}\n", distance));
    message.push_str(&format!("📉 *Unrealized PnL:* ${:.2}\n", snapshot.unrealized_pnl));
    message.push_str("\n*Action Required:* Consider closing position or adding margin!");

    message
}

/// On-demand position report for `/status`.
pub fn status_message(wallet: &str, threshold: Decimal, positions: &[PositionSnapshot]) -> String {
    if positions.is_empty() {
        return no_positions().to_string();
    }

    let mut message = String::from("📊 *Position Status*\n\n");
    message.push_str(&format!("*Wallet:* `{}`\n", wallet));
    message.push_str(&format!("*Alert Threshold:* ${:.2}\n\n", threshold));

    for snapshot in positions {
        let distance = snapshot
            .liquidation_price
            .map(|liquidation| distance_to_liquidation(snapshot.mark_price, liquidation));

        message.push_str(&format!(
            "{} *{}*\n",
            distance_marker(distance, threshold),
            snapshot.coin
        ));
        message.push_str(&format!("   Size: {}\n", snapshot.size));
        if let Some(entry) = snapshot.entry_price {
            message.push_str(&format!("   Entry Price: ${:.4}\n", entry));
            message.push_str(&format!("   Entry Value: ${:.2}\n", entry * snapshot.size.abs()));
        }
        message.push_str(&format!("   Current Price: ${:.4}\n", snapshot.mark_price));
        message.push_str(&format!("   Current Value: ${:.2}\n", snapshot.position_value));
        match snapshot.liquidation_price {
            Some(liquidation) => {
                message.push_str(&format!("   Liquidation Price: ${:.4}\n", liquidation));
            }
            None => message.push_str("   Liquidation Price: n/a\n"),
        }
        match distance {
            Some(distance) => {
                message.push_str(&format!("   Distance to Liquidation: ${:.2}\n", distance));
            }
            None => message.push_str("   Distance to Liquidation: n/a\n"),
        }
        message.push_str(&format!("   PnL: ${:.2}\n\n", snapshot.unrealized_pnl));
    }

    message
}

pub fn start_confirmation(wallet: &str, threshold: Decimal, poll_interval_secs: u64) -> String {
    format!(
        "✅ *Monitoring Started*\n\n\
         *Wallet:* `{wallet}`\n\
         *Alert Threshold:* ${threshold:.2}\n\n\
         I'll check your Ventuals positions every {poll_interval_secs}s and alert you \
         when you're within ${threshold:.2} of liquidation.\n\n\
         Use `/status` to check your current positions.\n\
         Use `/stop` to stop monitoring."
    )
}

pub fn stop_confirmation() -> &'static str {
    "🛑 Monitoring stopped. You won't receive liquidation alerts anymore."
}

pub fn not_monitored() -> &'static str {
    "❌ You're not being monitored. Use `/start <wallet_address>` to begin."
}

pub fn no_positions() -> &'static str {
    "📊 No active positions found."
}

pub fn invalid_address() -> &'static str {
    "❌ Invalid wallet address. Expected `0x` followed by 40 hex characters."
}

pub fn invalid_threshold() -> &'static str {
    "❌ Invalid threshold. Please use a positive number."
}

pub fn source_retry() -> &'static str {
    "❌ Unable to fetch positions. Please try again."
}

pub fn usage() -> &'static str {
    "🤖 *Ventuals Liquidation Alert Bot*\n\n\
     Usage: `/start <wallet_address> [threshold]`\n\n\
     Example: `/start 0x2BD5A85BFdBFB9B6CD3FB17F552a39E899BFcd40 10`\n\n\
     This will monitor your positions and alert when within $10 of liquidation."
}

pub fn help_text() -> &'static str {
    "🤖 *Ventuals Liquidation Alert Bot*\n\n\
     *Commands:*\n\
     `/start <wallet_address> [threshold]` - Start monitoring (default threshold: $5)\n\
     `/status` - Check current positions\n\
     `/stop` - Stop monitoring\n\
     `/help` - Show this help\n\n\
     *Example:*\n\
     `/start 0x2BD5A85BFdBFB9B6CD3FB17F552a39E899BFcd40 5`\n\n\
     This will monitor the wallet and alert when positions are within $5 of liquidation."
}

/// One-time notice after repeated fetch failures for a wallet.
pub fn source_trouble(wallet: &str, failures: u32) -> String {
    format!(
        "⚠️ *Venue Unreachable*\n\n\
         Position checks for `{}` have failed {} times in a row. \
         Monitoring continues and alerts resume once the venue recovers.",
        short_wallet(wallet),
        failures
    )
}

/// Admin overview of every registration.
pub fn subscriber_list(subscribers: &[Subscriber]) -> String {
    if subscribers.is_empty() {
        return "📋 No users currently being monitored.".to_string();
    }

    let mut message = String::from("📋 *Monitored Users:*\n\n");
    for subscriber in subscribers {
        message.push_str(&format!("*Chat ID:* {}\n", subscriber.chat_id));
        message.push_str(&format!("*Wallet:* `{}`\n", subscriber.wallet));
        message.push_str(&format!("*Threshold:* ${:.2}\n\n", subscriber.threshold));
    }

    message
}
