//! Type definitions for the clearinghouse-state API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request type for the venue info endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum InfoRequest {
    /// Get a wallet's margin and position state on a builder-deployed dex.
    #[serde(rename = "clearinghouseState")]
    ClearinghouseState { user: String, dex: String },
}

/// Response from the clearinghouseState endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearinghouseState {
    /// All positions for the wallet, open or flat.
    #[serde(default)]
    pub asset_positions: Vec<AssetPosition>,
    /// Server timestamp in milliseconds.
    #[serde(default)]
    pub time: i64,
}

/// Wrapper around one position entry.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetPosition {
    pub position: PositionData,
}

/// Raw position fields as the venue reports them.
///
/// Decimal fields arrive as JSON strings; `entryPx` and `liquidationPx`
/// can be null.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionData {
    /// Asset in dex-namespace form (e.g., "vntls:NVDA")
    pub coin: String,
    /// Signed size: positive = long, negative = short
    #[serde(with = "rust_decimal::serde::str")]
    pub szi: Decimal,
    pub leverage: Leverage,
    #[serde(default, deserialize_with = "deserialize_decimal_str_option_null")]
    pub entry_px: Option<Decimal>,
    /// Notional value of the position (always non-negative)
    #[serde(with = "rust_decimal::serde::str")]
    pub position_value: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub unrealized_pnl: Decimal,
    /// Null (or zero) when no liquidation level applies
    #[serde(default, deserialize_with = "deserialize_decimal_str_option_null")]
    pub liquidation_px: Option<Decimal>,
    /// Margin allocated to the position
    #[serde(default, deserialize_with = "deserialize_decimal_str_option_null")]
    pub margin_used: Option<Decimal>,
}

/// Leverage setting attached to a position.
#[derive(Debug, Clone, Deserialize)]
pub struct Leverage {
    #[serde(rename = "type")]
    pub mode: MarginMode,
    pub value: u32,
}

/// Position direction, derived from the sign of the size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
        }
    }
}

/// Margin mode for a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginMode {
    Cross,
    Isolated,
}

impl fmt::Display for MarginMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginMode::Cross => write!(f, "cross"),
            MarginMode::Isolated => write!(f, "isolated"),
        }
    }
}

/// One open position as observed at a poll instant.
#[derive(Debug, Clone)]
pub struct PositionSnapshot {
    /// Display symbol with the dex namespace stripped (e.g., "NVDA")
    pub coin: String,
    pub side: PositionSide,
    /// Signed size (positive long, negative short)
    pub size: Decimal,
    pub leverage: u32,
    pub margin_mode: MarginMode,
    pub entry_price: Option<Decimal>,
    /// Current notional value in quote currency
    pub position_value: Decimal,
    /// Mark price derived from position value / |size|
    pub mark_price: Decimal,
    pub liquidation_price: Option<Decimal>,
    pub unrealized_pnl: Decimal,
}

impl PositionData {
    /// Convert the wire position into a snapshot.
    ///
    /// Returns `None` for flat entries (zero size). A zero liquidation
    /// price is treated the same as a missing one.
    pub fn to_snapshot(&self) -> Option<PositionSnapshot> {
        if self.szi.is_zero() {
            return None;
        }

        let side = if self.szi > Decimal::ZERO {
            PositionSide::Long
        } else {
            PositionSide::Short
        };

        Some(PositionSnapshot {
            coin: display_symbol(&self.coin),
            side,
            size: self.szi,
            leverage: self.leverage.value,
            margin_mode: self.leverage.mode,
            entry_price: self.entry_px,
            position_value: self.position_value,
            mark_price: self.position_value / self.szi.abs(),
            liquidation_price: self.liquidation_px.filter(|px| !px.is_zero()),
            unrealized_pnl: self.unrealized_pnl,
        })
    }
}

/// Strip the builder-dex namespace for display ("vntls:NVDA" -> "NVDA").
pub fn display_symbol(coin: &str) -> String {
    match coin.split_once(':') {
        Some((_, name)) => name.to_string(),
        None => coin.to_string(),
    }
}

/// Check wallet address shape: `0x` followed by exactly 40 hex characters.
pub fn is_valid_address(address: &str) -> bool {
    let Some(digits) = address.strip_prefix("0x") else {
        return false;
    };
    digits.len() == 40 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Deserializer that handles both null JSON values and missing fields.
fn deserialize_decimal_str_option_null<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    // First try to deserialize as Option<String> to handle null
    let opt: Option<Option<String>> = Option::deserialize(deserializer)?;
    match opt {
        Some(Some(s)) if !s.is_empty() => s
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}
