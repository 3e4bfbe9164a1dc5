//! Per-market PnL, fee and open-exposure breakdowns, plus order-type counts.

use super::trade::{OrderType, Trade};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketPerformance {
    /// Short display label, see [`market_label`].
    pub market: String,
    pub full_market: String,
    pub trades: usize,
    pub pnl: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketFees {
    /// Base asset.
    pub market: String,
    pub trading: f64,
    pub funding: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketExposure {
    pub market: String,
    /// Leveraged notional of open positions.
    pub notional: f64,
    pub positions: usize,
    /// Share of total open notional, 0-100.
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderTypeCounts {
    pub market: usize,
    pub limit: usize,
}

/// `SOL-USDC` becomes `SOL`; perpetual names such as `PERP-1` are kept whole.
pub fn market_label(market: &str) -> &str {
    if market.starts_with("PERP-") {
        market
    } else {
        base_asset(market)
    }
}

fn base_asset(market: &str) -> &str {
    market.split('-').next().unwrap_or(market)
}

/// Groups `trades` by `key` preserving first-occurrence order.
fn group_by_key<'a, K>(
    trades: impl Iterator<Item = &'a Trade>,
    key: K,
) -> Vec<(String, Vec<&'a Trade>)>
where
    K: Fn(&Trade) -> &str,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&Trade>)> = Vec::new();
    for trade in trades {
        let k = key(trade);
        match index.get(k) {
            Some(&i) => groups[i].1.push(trade),
            None => {
                index.insert(k.to_string(), groups.len());
                groups.push((k.to_string(), vec![trade]));
            }
        }
    }
    groups
}

/// Every trade, grouped by full market name, largest absolute PnL first.
pub fn market_breakdown(trades: &[Trade]) -> Vec<MarketPerformance> {
    let mut rows: Vec<MarketPerformance> = group_by_key(trades.iter(), |t| t.market.as_str())
        .into_iter()
        .map(|(full_market, group)| MarketPerformance {
            market: market_label(&full_market).to_string(),
            trades: group.len(),
            pnl: group.iter().map(|t| t.pnl_or_zero()).sum(),
            volume: group.iter().map(|t| t.notional()).sum(),
            full_market,
        })
        .collect();
    rows.sort_by(|a, b| b.pnl.abs().total_cmp(&a.pnl.abs()));
    rows
}

/// Fees grouped by base asset, highest total first.
pub fn fee_breakdown(trades: &[Trade]) -> Vec<MarketFees> {
    let mut rows: Vec<MarketFees> = group_by_key(trades.iter(), |t| base_asset(&t.market))
        .into_iter()
        .map(|(market, group)| {
            let trading: f64 = group.iter().map(|t| t.fees.trading).sum();
            let funding: f64 = group.iter().map(|t| t.fees.funding).sum();
            MarketFees {
                market,
                trading,
                funding,
                total: group.iter().map(|t| t.fees.total()).sum(),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.total.total_cmp(&a.total));
    rows
}

/// Leveraged notional of open trades per market label, largest first.
pub fn exposure_breakdown(trades: &[Trade]) -> Vec<MarketExposure> {
    let groups = group_by_key(trades.iter().filter(|t| t.is_open()), |t| {
        market_label(&t.market)
    });

    let mut rows: Vec<MarketExposure> = groups
        .into_iter()
        .map(|(market, group)| MarketExposure {
            market,
            notional: group
                .iter()
                .map(|t| (t.notional() * t.leverage.unwrap_or(1.0)).abs())
                .sum(),
            positions: group.len(),
            percent: 0.0,
        })
        .collect();

    let total: f64 = rows.iter().map(|r| r.notional).sum();
    if total > 0.0 {
        for row in &mut rows {
            row.percent = row.notional / total * 100.0;
        }
    }
    rows.sort_by(|a, b| b.notional.total_cmp(&a.notional));
    rows
}

pub fn order_type_counts(trades: &[Trade]) -> OrderTypeCounts {
    trades
        .iter()
        .fold(OrderTypeCounts::default(), |mut counts, t| {
            match t.order_type {
                OrderType::Market => counts.market += 1,
                OrderType::Limit => counts.limit += 1,
            }
            counts
        })
}
