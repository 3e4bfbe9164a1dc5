//! Journal view filters applied before any analytics run.

use super::trade::{OrderType, Side, Trade, TradeStatus};
use chrono::{DateTime, Utc};

/// Every restriction is optional; an empty list or `None` bound admits all
/// trades.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeFilters {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub markets: Vec<String>,
    pub sides: Vec<Side>,
    pub statuses: Vec<TradeStatus>,
    pub order_types: Vec<OrderType>,
    pub min_pnl: Option<f64>,
    pub max_pnl: Option<f64>,
}

impl TradeFilters {
    pub fn is_empty(&self) -> bool {
        *self == TradeFilters::default()
    }

    /// Date bounds are inclusive. PnL bounds compare against the PnL with a
    /// missing value counted as zero.
    pub fn matches(&self, trade: &Trade) -> bool {
        if self.start.is_some_and(|start| trade.timestamp < start) {
            return false;
        }
        if self.end.is_some_and(|end| trade.timestamp > end) {
            return false;
        }
        if !self.markets.is_empty() && !self.markets.iter().any(|m| *m == trade.market) {
            return false;
        }
        if !self.sides.is_empty() && !self.sides.contains(&trade.side) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&trade.status) {
            return false;
        }
        if !self.order_types.is_empty() && !self.order_types.contains(&trade.order_type) {
            return false;
        }
        let pnl = trade.pnl_or_zero();
        if self.min_pnl.is_some_and(|min| pnl < min) {
            return false;
        }
        if self.max_pnl.is_some_and(|max| pnl > max) {
            return false;
        }
        true
    }
}

pub fn apply_filters(trades: &[Trade], filters: &TradeFilters) -> Vec<Trade> {
    trades
        .iter()
        .filter(|t| filters.matches(t))
        .cloned()
        .collect()
}
