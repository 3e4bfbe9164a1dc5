//! Chronological equity / cumulative PnL / drawdown series for charting.

use super::trade::{sorted_by_time, Trade};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PnlDataPoint {
    pub timestamp: DateTime<Utc>,
    /// This trade's own PnL.
    pub pnl: f64,
    pub cumulative_pnl: f64,
    /// Percent below the running peak.
    pub drawdown: f64,
    pub equity: f64,
}

/// One point per closed trade, oldest first.
pub fn generate_pnl_chart_data(trades: &[Trade], initial_capital: f64) -> Vec<PnlDataPoint> {
    let sorted = sorted_by_time(trades.iter().filter(|t| t.is_closed()));

    let mut cumulative_pnl = 0.0;
    let mut equity = initial_capital;
    let mut peak = initial_capital;

    sorted
        .into_iter()
        .map(|trade| {
            let pnl = trade.pnl_or_zero();
            cumulative_pnl += pnl;
            equity += pnl;
            if equity > peak {
                peak = equity;
            }
            let drawdown = if peak > 0.0 {
                (peak - equity) / peak * 100.0
            } else {
                0.0
            };

            PnlDataPoint {
                timestamp: trade.timestamp,
                pnl,
                cumulative_pnl,
                drawdown,
                equity,
            }
        })
        .collect()
}
