//! Trailing-window win rate and average PnL over closed trades.

use super::trade::{sorted_by_time, Trade};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_ROLLING_WINDOW: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingPoint {
    /// 1-based position in the chronological sample.
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    /// Trades in the window ending at this point.
    pub window_len: usize,
    pub rolling_win_rate: f64,
    pub rolling_avg_pnl: f64,
}

/// A window of 0 is treated as 1.
pub fn rolling_performance(trades: &[Trade], window: usize) -> Vec<RollingPoint> {
    let window = window.max(1);
    let sample = sorted_by_time(trades.iter().filter(|t| t.is_closed() && t.pnl.is_some()));

    (0..sample.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &sample[start..=i];
            let wins = slice.iter().filter(|t| t.pnl_or_zero() > 0.0).count();
            let total: f64 = slice.iter().map(|t| t.pnl_or_zero()).sum();
            let n = slice.len() as f64;

            RollingPoint {
                index: i + 1,
                timestamp: sample[i].timestamp,
                window_len: slice.len(),
                rolling_win_rate: wins as f64 / n * 100.0,
                rolling_avg_pnl: total / n,
            }
        })
        .collect()
}
