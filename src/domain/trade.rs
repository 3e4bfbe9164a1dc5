//! Trade records consumed by every analytics function.

use crate::domain::error::JournalError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
    Liquidated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Spot,
    Perpetual,
    Options,
}

/// Fees attributed to a trade. Funding may be negative (a receipt).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Fees {
    pub trading: f64,
    pub funding: f64,
}

impl Fees {
    pub fn total(&self) -> f64 {
        self.trading + self.funding
    }
}

/// A single fill or position as reported by the exchange.
///
/// `pnl` is `None` while it is not yet determined, which is distinct from a
/// flat `Some(0.0)`. Open trades carry unrealized PnL (when known) and no
/// exit price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub id: String,
    pub tx_signature: String,
    pub timestamp: DateTime<Utc>,
    pub market: String,
    pub market_type: MarketType,
    pub side: Side,
    pub order_type: OrderType,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub quantity: f64,
    pub leverage: Option<f64>,
    pub pnl: Option<f64>,
    pub pnl_percent: Option<f64>,
    pub fees: Fees,
    pub status: TradeStatus,
    /// Seconds the position was held.
    pub duration: Option<u64>,
    pub annotations: Vec<String>,
}

impl Trade {
    /// PnL with an undetermined value counted as zero.
    pub fn pnl_or_zero(&self) -> f64 {
        self.pnl.unwrap_or(0.0)
    }

    /// Entry notional in quote currency.
    pub fn notional(&self) -> f64 {
        self.quantity * self.entry_price
    }

    pub fn is_closed(&self) -> bool {
        self.status == TradeStatus::Closed
    }

    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    pub fn is_long(&self) -> bool {
        self.side == Side::Long
    }
}

/// Stable chronological ordering of borrowed trades.
pub fn sorted_by_time<'a, I>(trades: I) -> Vec<&'a Trade>
where
    I: IntoIterator<Item = &'a Trade>,
{
    let mut sorted: Vec<&Trade> = trades.into_iter().collect();
    sorted.sort_by_key(|t| t.timestamp);
    sorted
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

impl FromStr for Side {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" | "buy" => Ok(Side::Long),
            "short" | "sell" => Ok(Side::Short),
            _ => Err(JournalError::parse("side", s)),
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeStatus::Open => write!(f, "open"),
            TradeStatus::Closed => write!(f, "closed"),
            TradeStatus::Liquidated => write!(f, "liquidated"),
        }
    }
}

impl FromStr for TradeStatus {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(TradeStatus::Open),
            "closed" => Ok(TradeStatus::Closed),
            "liquidated" => Ok(TradeStatus::Liquidated),
            _ => Err(JournalError::parse("status", s)),
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "market"),
            OrderType::Limit => write!(f, "limit"),
        }
    }
}

impl FromStr for OrderType {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "market" => Ok(OrderType::Market),
            "limit" => Ok(OrderType::Limit),
            _ => Err(JournalError::parse("order type", s)),
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketType::Spot => write!(f, "spot"),
            MarketType::Perpetual => write!(f, "perpetual"),
            MarketType::Options => write!(f, "options"),
        }
    }
}

impl FromStr for MarketType {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spot" => Ok(MarketType::Spot),
            "perpetual" | "perp" => Ok(MarketType::Perpetual),
            "options" | "option" => Ok(MarketType::Options),
            _ => Err(JournalError::parse("market type", s)),
        }
    }
}
