//! Daily discipline goals and today's progress against them.

use super::time_performance::day_stats;
use super::trade::Trade;
use chrono::{NaiveDate, TimeZone};
use serde::Serialize;

pub const DEFAULT_MAX_TRADES_PER_DAY: u32 = 10;
pub const DEFAULT_MAX_LOSS_PER_DAY: f64 = 200.0;
pub const DEFAULT_TARGET_R_PER_TRADE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Goals {
    pub max_trades_per_day: Option<u32>,
    /// Positive amount in quote currency.
    pub max_loss_per_day: Option<f64>,
    pub target_r_per_trade: Option<f64>,
}

impl Default for Goals {
    fn default() -> Self {
        Goals {
            max_trades_per_day: Some(DEFAULT_MAX_TRADES_PER_DAY),
            max_loss_per_day: Some(DEFAULT_MAX_LOSS_PER_DAY),
            target_r_per_trade: Some(DEFAULT_TARGET_R_PER_TRADE),
        }
    }
}

impl Goals {
    /// Zero or negative limits mean "no goal".
    pub fn new(
        max_trades_per_day: Option<i64>,
        max_loss_per_day: Option<f64>,
        target_r_per_trade: Option<f64>,
    ) -> Self {
        Goals {
            max_trades_per_day: max_trades_per_day
                .filter(|&v| v > 0)
                .map(|v| u32::try_from(v).unwrap_or(u32::MAX)),
            max_loss_per_day: max_loss_per_day.filter(|&v| v > 0.0),
            target_r_per_trade: target_r_per_trade.filter(|&v| v > 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalProgress {
    pub date: NaiveDate,
    pub trades_today: usize,
    pub pnl_today: f64,
    pub trades_limit_reached: bool,
    pub loss_limit_breached: bool,
}

pub fn evaluate_goals<Tz: TimeZone>(
    trades: &[Trade],
    goals: &Goals,
    today: NaiveDate,
    tz: &Tz,
) -> GoalProgress {
    let stats = day_stats(trades, today, tz);

    let trades_limit_reached = goals
        .max_trades_per_day
        .is_some_and(|max| stats.trades >= max as usize);
    let loss_limit_breached = goals
        .max_loss_per_day
        .is_some_and(|max| stats.pnl <= -max);

    GoalProgress {
        date: today,
        trades_today: stats.trades,
        pnl_today: stats.pnl,
        trades_limit_reached,
        loss_limit_breached,
    }
}
