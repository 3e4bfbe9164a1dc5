//! Whole-history portfolio statistics.
//!
//! Win/loss, expectancy and drawdown figures use closed trades only. Counts,
//! long/short split, fees and volume use the full list, so open and
//! liquidated trades still contribute exposure and cost.

use super::trade::{sorted_by_time, Trade};
use serde::Serialize;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioAnalytics {
    pub total_pnl: f64,
    pub total_pnl_percent: f64,
    pub unrealized_pnl: f64,
    pub realized_pnl: f64,

    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percentage, 0-100.
    pub win_rate: f64,

    pub gross_profit: f64,
    pub gross_loss: f64,
    pub average_win: f64,
    /// Always zero or negative.
    pub average_loss: f64,
    /// Seconds.
    pub average_trade_duration: f64,
    /// `f64::INFINITY` when there are profits and no losses.
    pub profit_factor: f64,
    pub risk_reward_ratio: f64,
    pub expectancy: f64,

    pub largest_win: Option<Trade>,
    pub largest_loss: Option<Trade>,
    pub max_drawdown: f64,
    pub max_drawdown_percent: f64,
    pub current_drawdown: f64,

    pub long_count: usize,
    pub short_count: usize,
    pub long_pnl: f64,
    pub short_pnl: f64,
    pub long_short_ratio: f64,

    pub total_trading_fees: f64,
    pub total_funding_fees: f64,
    pub total_fees: f64,
    pub avg_fee_per_trade: f64,

    pub total_volume: f64,
    pub avg_trade_size: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DrawdownStats {
    pub max_drawdown: f64,
    pub max_drawdown_percent: f64,
    pub current_drawdown: f64,
}

pub fn calculate_analytics(trades: &[Trade], initial_capital: f64) -> PortfolioAnalytics {
    let closed: Vec<&Trade> = trades.iter().filter(|t| t.is_closed()).collect();
    let open: Vec<&Trade> = trades.iter().filter(|t| t.is_open()).collect();

    let winning: Vec<&Trade> = closed
        .iter()
        .copied()
        .filter(|t| t.pnl_or_zero() > 0.0)
        .collect();
    let losing: Vec<&Trade> = closed
        .iter()
        .copied()
        .filter(|t| t.pnl_or_zero() < 0.0)
        .collect();

    let realized_pnl = sum_pnl(&closed);
    let unrealized_pnl = sum_pnl(&open);
    let total_pnl = realized_pnl + unrealized_pnl;
    let total_pnl_percent = total_pnl / initial_capital * 100.0;

    let win_rate = if closed.is_empty() {
        0.0
    } else {
        winning.len() as f64 / closed.len() as f64 * 100.0
    };

    let gross_profit = sum_pnl(&winning);
    let gross_loss = sum_pnl(&losing).abs();
    let average_win = if winning.is_empty() {
        0.0
    } else {
        gross_profit / winning.len() as f64
    };
    let average_loss = if losing.is_empty() {
        0.0
    } else {
        -gross_loss / losing.len() as f64
    };

    let durations: Vec<u64> = closed.iter().filter_map(|t| t.duration).collect();
    let average_trade_duration = if durations.is_empty() {
        0.0
    } else {
        durations.iter().map(|&d| d as f64).sum::<f64>() / durations.len() as f64
    };

    let profit_factor = if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    let risk_reward_ratio = if average_loss != 0.0 {
        (average_win / average_loss).abs()
    } else {
        0.0
    };

    let win_fraction = win_rate / 100.0;
    let expectancy = win_fraction * average_win + (1.0 - win_fraction) * average_loss;

    // Strict comparisons keep the first trade on ties.
    let largest_win = winning
        .iter()
        .copied()
        .reduce(|best, t| if t.pnl_or_zero() > best.pnl_or_zero() { t } else { best })
        .cloned();
    let largest_loss = losing
        .iter()
        .copied()
        .reduce(|worst, t| if t.pnl_or_zero() < worst.pnl_or_zero() { t } else { worst })
        .cloned();

    let drawdown = compute_drawdown(closed.iter().copied(), initial_capital);

    let (longs, shorts): (Vec<&Trade>, Vec<&Trade>) = trades.iter().partition(|t| t.is_long());
    let long_short_ratio = if shorts.is_empty() {
        longs.len() as f64
    } else {
        longs.len() as f64 / shorts.len() as f64
    };

    let total_trading_fees: f64 = trades.iter().map(|t| t.fees.trading).sum();
    let total_funding_fees: f64 = trades.iter().map(|t| t.fees.funding).sum();
    let total_fees: f64 = trades.iter().map(|t| t.fees.total()).sum();
    let total_volume: f64 = trades.iter().map(Trade::notional).sum();

    let (avg_fee_per_trade, avg_trade_size) = if trades.is_empty() {
        (0.0, 0.0)
    } else {
        let n = trades.len() as f64;
        (total_fees / n, total_volume / n)
    };

    PortfolioAnalytics {
        total_pnl,
        total_pnl_percent,
        unrealized_pnl,
        realized_pnl,
        total_trades: trades.len(),
        winning_trades: winning.len(),
        losing_trades: losing.len(),
        win_rate,
        gross_profit,
        gross_loss,
        average_win,
        average_loss,
        average_trade_duration,
        profit_factor,
        risk_reward_ratio,
        expectancy,
        largest_win,
        largest_loss,
        max_drawdown: drawdown.max_drawdown,
        max_drawdown_percent: drawdown.max_drawdown_percent,
        current_drawdown: drawdown.current_drawdown,
        long_count: longs.len(),
        short_count: shorts.len(),
        long_pnl: sum_pnl(&longs),
        short_pnl: sum_pnl(&shorts),
        long_short_ratio,
        total_trading_fees,
        total_funding_fees,
        total_fees,
        avg_fee_per_trade,
        total_volume,
        avg_trade_size,
    }
}

/// Peak-to-trough statistics of the running equity built from `trades` in
/// chronological order, starting from `initial_capital`.
pub fn compute_drawdown<'a, I>(trades: I, initial_capital: f64) -> DrawdownStats
where
    I: IntoIterator<Item = &'a Trade>,
{
    let sorted = sorted_by_time(trades);
    if sorted.is_empty() {
        return DrawdownStats::default();
    }

    let mut equity = initial_capital;
    let mut peak = initial_capital;
    let mut max_drawdown = 0.0_f64;

    for trade in sorted {
        equity += trade.pnl_or_zero();
        if equity > peak {
            peak = equity;
        }
        let drawdown = peak - equity;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }
    }

    let max_drawdown_percent = if peak > 0.0 {
        max_drawdown / peak * 100.0
    } else {
        0.0
    };

    DrawdownStats {
        max_drawdown,
        max_drawdown_percent,
        current_drawdown: peak - equity,
    }
}

fn sum_pnl(trades: &[&Trade]) -> f64 {
    trades.iter().map(|t| t.pnl_or_zero()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::test_support::{closed_trade, with_status};
    use crate::domain::trade::{Fees, Side, TradeStatus};
    use approx::assert_relative_eq;

    #[test]
    fn empty_trade_list_yields_zeroed_record() {
        let a = calculate_analytics(&[], DEFAULT_INITIAL_CAPITAL);
        assert_eq!(a.total_trades, 0);
        assert_eq!(a.total_pnl, 0.0);
        assert_eq!(a.win_rate, 0.0);
        assert_eq!(a.profit_factor, 0.0);
        assert_eq!(a.max_drawdown, 0.0);
        assert_eq!(a.avg_fee_per_trade, 0.0);
        assert_eq!(a.avg_trade_size, 0.0);
        assert_eq!(a.long_short_ratio, 0.0);
        assert!(a.largest_win.is_none());
        assert!(a.largest_loss.is_none());
    }

    #[test]
    fn single_winning_trade() {
        let trade = closed_trade("t1", 10.0, 0);
        let a = calculate_analytics(std::slice::from_ref(&trade), 10_000.0);

        assert_eq!(a.total_pnl, 10.0);
        assert_relative_eq!(a.total_pnl_percent, 0.1);
        assert_eq!(a.win_rate, 100.0);
        assert!(a.profit_factor.is_infinite());
        assert_eq!(a.average_win, 10.0);
        assert_eq!(a.average_loss, 0.0);
        assert_eq!(a.risk_reward_ratio, 0.0);
        assert_eq!(a.max_drawdown, 0.0);
        assert_eq!(a.largest_win, Some(trade));
        assert_eq!(a.largest_loss, None);
    }

    #[test]
    fn win_then_loss_drawdown() {
        let trades = vec![closed_trade("a", 50.0, 0), closed_trade("b", -30.0, 1)];
        let a = calculate_analytics(&trades, 1_000.0);

        assert_eq!(a.realized_pnl, 20.0);
        assert_eq!(a.max_drawdown, 30.0);
        assert_eq!(a.current_drawdown, 30.0);
        assert_relative_eq!(a.max_drawdown_percent, 30.0 / 1050.0 * 100.0);
    }

    #[test]
    fn drawdown_walk_uses_chronological_order() {
        // Input order is reversed; the walk must still see +50 before -30.
        let trades = vec![closed_trade("b", -30.0, 10), closed_trade("a", 50.0, 0)];
        let dd = compute_drawdown(&trades, 1_000.0);
        assert_eq!(dd.max_drawdown, 30.0);
        assert_eq!(dd.current_drawdown, 30.0);
    }

    #[test]
    fn current_drawdown_can_be_below_max() {
        let trades = vec![closed_trade("a", -100.0, 0), closed_trade("b", 60.0, 1)];
        let dd = compute_drawdown(&trades, 1_000.0);
        assert_eq!(dd.max_drawdown, 100.0);
        assert_eq!(dd.current_drawdown, 40.0);
        assert_relative_eq!(dd.max_drawdown_percent, 10.0);
    }

    #[test]
    fn averages_profit_factor_and_expectancy() {
        let trades = vec![
            closed_trade("a", 100.0, 0),
            closed_trade("b", -60.0, 1),
            closed_trade("c", 200.0, 2),
            closed_trade("d", -40.0, 3),
        ];
        let a = calculate_analytics(&trades, 10_000.0);

        assert_eq!(a.winning_trades, 2);
        assert_eq!(a.losing_trades, 2);
        assert_eq!(a.win_rate, 50.0);
        assert_eq!(a.gross_profit, 300.0);
        assert_eq!(a.gross_loss, 100.0);
        assert_eq!(a.average_win, 150.0);
        assert_eq!(a.average_loss, -50.0);
        assert_relative_eq!(a.profit_factor, 3.0);
        assert_relative_eq!(a.risk_reward_ratio, 3.0);
        assert_relative_eq!(a.expectancy, 0.5 * 150.0 + 0.5 * -50.0);
    }

    #[test]
    fn zero_pnl_trades_are_neither_wins_nor_losses() {
        let trades = vec![
            closed_trade("a", 10.0, 0),
            closed_trade("b", 0.0, 1),
            closed_trade("c", -10.0, 2),
            closed_trade("d", 0.0, 3),
        ];
        let a = calculate_analytics(&trades, 10_000.0);
        assert_eq!(a.winning_trades, 1);
        assert_eq!(a.losing_trades, 1);
        assert_eq!(a.win_rate, 25.0);
    }

    #[test]
    fn only_winners_gives_infinite_profit_factor() {
        let trades = vec![closed_trade("a", 5.0, 0), closed_trade("b", 7.0, 1)];
        let a = calculate_analytics(&trades, 10_000.0);
        assert_eq!(a.profit_factor, f64::INFINITY);
        assert_eq!(a.losing_trades, 0);
    }

    #[test]
    fn largest_win_and_loss_keep_first_on_ties() {
        let trades = vec![
            closed_trade("w1", 30.0, 0),
            closed_trade("w2", 30.0, 1),
            closed_trade("l1", -20.0, 2),
            closed_trade("l2", -20.0, 3),
            closed_trade("w3", 10.0, 4),
        ];
        let a = calculate_analytics(&trades, 10_000.0);
        assert_eq!(a.largest_win.map(|t| t.id), Some("w1".to_string()));
        assert_eq!(a.largest_loss.map(|t| t.id), Some("l1".to_string()));
    }

    #[test]
    fn open_trades_are_unrealized_and_liquidated_only_in_totals() {
        let mut liquidated = with_status(closed_trade("liq", -80.0, 2), TradeStatus::Liquidated);
        liquidated.fees = Fees {
            trading: 2.0,
            funding: 0.5,
        };
        let mut open = with_status(closed_trade("open", 15.0, 1), TradeStatus::Open);
        open.fees = Fees {
            trading: 1.0,
            funding: -0.5,
        };
        let trades = vec![closed_trade("c", 20.0, 0), open, liquidated];

        let a = calculate_analytics(&trades, 10_000.0);

        assert_eq!(a.total_trades, 3);
        assert_eq!(a.realized_pnl, 20.0);
        assert_eq!(a.unrealized_pnl, 15.0);
        assert_eq!(a.total_pnl, 35.0);
        assert_eq!(a.win_rate, 100.0);
        assert_eq!(a.losing_trades, 0);
        assert_eq!(a.max_drawdown, 0.0);
        // Long PnL covers every trade, including the liquidation.
        assert_eq!(a.long_count, 3);
        assert_eq!(a.long_pnl, -45.0);
        assert_eq!(a.total_trading_fees, 3.0);
        assert_eq!(a.total_funding_fees, 0.0);
        assert_eq!(a.total_fees, 3.0);
        assert_eq!(a.avg_fee_per_trade, 1.0);
        assert_eq!(a.total_volume, 300.0);
        assert_eq!(a.avg_trade_size, 100.0);
    }

    #[test]
    fn missing_pnl_counts_as_zero() {
        let mut pending = closed_trade("p", 0.0, 1);
        pending.pnl = None;
        let trades = vec![closed_trade("a", 40.0, 0), pending];
        let a = calculate_analytics(&trades, 1_000.0);
        assert_eq!(a.realized_pnl, 40.0);
        assert_eq!(a.winning_trades, 1);
        assert_eq!(a.win_rate, 50.0);
    }

    #[test]
    fn average_duration_skips_missing_values() {
        let mut a = closed_trade("a", 1.0, 0);
        a.duration = Some(100);
        let mut b = closed_trade("b", 1.0, 1);
        b.duration = None;
        let mut c = closed_trade("c", 1.0, 2);
        c.duration = Some(300);
        let stats = calculate_analytics(&[a, b, c], 10_000.0);
        assert_eq!(stats.average_trade_duration, 200.0);
    }

    #[test]
    fn long_short_ratio() {
        let mut s1 = closed_trade("s1", -5.0, 0);
        s1.side = Side::Short;
        let trades = vec![closed_trade("l1", 1.0, 1), closed_trade("l2", 2.0, 2), s1];
        let a = calculate_analytics(&trades, 10_000.0);
        assert_eq!(a.long_count, 2);
        assert_eq!(a.short_count, 1);
        assert_eq!(a.long_short_ratio, 2.0);
        assert_eq!(a.long_pnl, 3.0);
        assert_eq!(a.short_pnl, -5.0);

        let longs_only = calculate_analytics(&trades[..2], 10_000.0);
        assert_eq!(longs_only.long_short_ratio, 2.0);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let trades = vec![
            closed_trade("a", 12.25, 0),
            closed_trade("b", -3.5, 1),
            with_status(closed_trade("c", 4.0, 2), TradeStatus::Open),
        ];
        let first = calculate_analytics(&trades, 5_000.0);
        let second = calculate_analytics(&trades, 5_000.0);
        assert_eq!(first, second);
    }
}
