//! Terminal rendering of analytics results as aligned text tables or JSON.

use crate::domain::analytics::PortfolioAnalytics;
use crate::domain::breakdown::{MarketExposure, MarketFees, MarketPerformance, OrderTypeCounts};
use crate::domain::coaching::{Insight, Tone};
use crate::domain::error::JournalError;
use crate::domain::goals::{GoalProgress, Goals};
use crate::domain::pnl_series::PnlDataPoint;
use crate::domain::r_multiple::RDistribution;
use crate::domain::rolling::RollingPoint;
use crate::domain::time_performance::{GroupBy, TimePerformance};
use crate::domain::trade::Trade;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// One renderable command result.
pub enum Report<'a> {
    Summary(&'a PortfolioAnalytics),
    Equity(&'a [PnlDataPoint]),
    Periods {
        group_by: GroupBy,
        rows: &'a [TimePerformance],
    },
    RMultiples(Option<&'a RDistribution>),
    Rolling {
        window: usize,
        points: &'a [RollingPoint],
    },
    Markets(&'a [MarketPerformance]),
    Fees(&'a [MarketFees]),
    Exposure(&'a [MarketExposure]),
    OrderTypes(&'a OrderTypeCounts),
    Goals {
        goals: &'a Goals,
        progress: &'a GoalProgress,
    },
    Coach(&'a Insight),
}

#[derive(Serialize)]
struct GoalsView<'a> {
    goals: &'a Goals,
    progress: &'a GoalProgress,
}

#[derive(Serialize)]
struct RollingView<'a> {
    window: usize,
    points: &'a [RollingPoint],
}

#[derive(Serialize)]
struct PeriodsView<'a> {
    group_by: GroupBy,
    periods: &'a [TimePerformance],
}

impl Report<'_> {
    pub fn render(&self, format: ReportFormat) -> Result<String, JournalError> {
        match format {
            ReportFormat::Text => Ok(self.to_text()),
            ReportFormat::Json => self.to_json(),
        }
    }

    /// Non-finite numbers (an unbounded profit factor) serialize as `null`.
    pub fn to_json(&self) -> Result<String, JournalError> {
        let json = match self {
            Report::Summary(a) => serde_json::to_string_pretty(a)?,
            Report::Equity(points) => serde_json::to_string_pretty(points)?,
            Report::Periods { group_by, rows } => serde_json::to_string_pretty(&PeriodsView {
                group_by: *group_by,
                periods: *rows,
            })?,
            Report::RMultiples(dist) => serde_json::to_string_pretty(dist)?,
            Report::Rolling { window, points } => serde_json::to_string_pretty(&RollingView {
                window: *window,
                points: *points,
            })?,
            Report::Markets(rows) => serde_json::to_string_pretty(rows)?,
            Report::Fees(rows) => serde_json::to_string_pretty(rows)?,
            Report::Exposure(rows) => serde_json::to_string_pretty(rows)?,
            Report::OrderTypes(counts) => serde_json::to_string_pretty(counts)?,
            Report::Goals { goals, progress } => serde_json::to_string_pretty(&GoalsView {
                goals: *goals,
                progress: *progress,
            })?,
            Report::Coach(insight) => serde_json::to_string_pretty(insight)?,
        };
        Ok(json)
    }

    pub fn to_text(&self) -> String {
        match self {
            Report::Summary(a) => render_summary(a),
            Report::Equity(points) => render_equity(points),
            Report::Periods { group_by, rows } => render_periods(*group_by, rows),
            Report::RMultiples(dist) => render_r_multiples(*dist),
            Report::Rolling { window, points } => render_rolling(*window, points),
            Report::Markets(rows) => render_markets(rows),
            Report::Fees(rows) => render_fees(rows),
            Report::Exposure(rows) => render_exposure(rows),
            Report::OrderTypes(counts) => render_order_types(counts),
            Report::Goals { goals, progress } => render_goals(goals, progress),
            Report::Coach(insight) => render_insight(insight),
        }
    }
}

/// Column-aligned plain text table. The first column is left aligned, the
/// rest right aligned.
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let mut output = String::new();
        output.push_str(&format_line(&self.headers, &widths));
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        output.push_str(&format_line(&rule, &widths));
        for row in &self.rows {
            output.push_str(&format_line(row, &widths));
        }
        output
    }
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let parts: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, &w))| {
            if i == 0 {
                format!("{cell:<w$}")
            } else {
                format!("{cell:>w$}")
            }
        })
        .collect();
    let mut line = parts.join("  ").trim_end().to_string();
    line.push('\n');
    line
}

fn fmt_currency(value: f64) -> String {
    if value >= 0.0 {
        format!("${:.2}", value)
    } else {
        format!("-${:.2}", value.abs())
    }
}

fn fmt_ratio(value: f64) -> String {
    if value.is_infinite() {
        "∞".to_string()
    } else {
        format!("{value:.2}")
    }
}

fn fmt_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (h, m) = (total / 3600, (total % 3600) / 60);
    if h > 0 {
        format!("{h}h {m}m")
    } else {
        format!("{m}m {}s", total % 60)
    }
}

fn fmt_trade(trade: &Option<Trade>) -> String {
    match trade {
        Some(t) => format!(
            "{} ({} {} {})",
            fmt_currency(t.pnl_or_zero()),
            t.market,
            t.side,
            t.timestamp.format("%Y-%m-%d %H:%M")
        ),
        None => "-".to_string(),
    }
}

pub fn render_summary(a: &PortfolioAnalytics) -> String {
    let mut table = Table::new(&["Metric", "Value"]);
    let mut add = |name: &str, value: String| table.row(vec![name.to_string(), value]);

    add("Total PnL", fmt_currency(a.total_pnl));
    add("Total Return", format!("{:.2}%", a.total_pnl_percent));
    add("Realized PnL", fmt_currency(a.realized_pnl));
    add("Unrealized PnL", fmt_currency(a.unrealized_pnl));
    add("Total Trades", a.total_trades.to_string());
    add("Winning Trades", a.winning_trades.to_string());
    add("Losing Trades", a.losing_trades.to_string());
    add("Win Rate", format!("{:.1}%", a.win_rate));
    add("Gross Profit", fmt_currency(a.gross_profit));
    add("Gross Loss", fmt_currency(a.gross_loss));
    add("Average Win", fmt_currency(a.average_win));
    add("Average Loss", fmt_currency(a.average_loss));
    add("Profit Factor", fmt_ratio(a.profit_factor));
    add("Risk/Reward", fmt_ratio(a.risk_reward_ratio));
    add("Expectancy", fmt_currency(a.expectancy));
    add("Avg Duration", fmt_duration(a.average_trade_duration));
    add("Largest Win", fmt_trade(&a.largest_win));
    add("Largest Loss", fmt_trade(&a.largest_loss));
    add("Max Drawdown", fmt_currency(a.max_drawdown));
    add("Max Drawdown %", format!("{:.2}%", a.max_drawdown_percent));
    add("Current Drawdown", fmt_currency(a.current_drawdown));
    add(
        "Long / Short",
        format!("{} / {} (ratio {})", a.long_count, a.short_count, fmt_ratio(a.long_short_ratio)),
    );
    add("Long PnL", fmt_currency(a.long_pnl));
    add("Short PnL", fmt_currency(a.short_pnl));
    add("Trading Fees", fmt_currency(a.total_trading_fees));
    add("Funding Fees", fmt_currency(a.total_funding_fees));
    add("Total Fees", fmt_currency(a.total_fees));
    add("Avg Fee / Trade", fmt_currency(a.avg_fee_per_trade));
    add("Total Volume", fmt_currency(a.total_volume));
    add("Avg Trade Size", fmt_currency(a.avg_trade_size));

    format!("Portfolio Summary\n\n{}", table.render())
}

pub fn render_equity(points: &[PnlDataPoint]) -> String {
    if points.is_empty() {
        return "Equity Curve\n\nNo closed trades.\n".to_string();
    }
    let mut table = Table::new(&["Time", "PnL", "Cumulative", "Equity", "Drawdown"]);
    for p in points {
        table.row(vec![
            p.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            fmt_currency(p.pnl),
            fmt_currency(p.cumulative_pnl),
            fmt_currency(p.equity),
            format!("{:.2}%", p.drawdown),
        ]);
    }
    format!("Equity Curve\n\n{}", table.render())
}

pub fn render_periods(group_by: GroupBy, rows: &[TimePerformance]) -> String {
    let title = match group_by {
        GroupBy::Day => "Performance by Day",
        GroupBy::Hour => "Performance by Hour",
        GroupBy::Weekday => "Performance by Weekday",
    };
    if rows.is_empty() {
        return format!("{title}\n\nNo closed trades.\n");
    }
    let mut table = Table::new(&["Period", "Trades", "PnL", "Win Rate", "Volume"]);
    for r in rows {
        table.row(vec![
            r.period.clone(),
            r.trades.to_string(),
            fmt_currency(r.pnl),
            format!("{:.1}%", r.win_rate),
            fmt_currency(r.volume),
        ]);
    }
    format!("{title}\n\n{}", table.render())
}

pub fn render_r_multiples(dist: Option<&RDistribution>) -> String {
    let Some(dist) = dist else {
        return "R-Multiple Distribution\n\nNeeds at least one losing closed trade to define 1R.\n"
            .to_string();
    };
    let mut table = Table::new(&["Bucket", "Trades", "Share"]);
    for b in &dist.buckets {
        let share = b.count as f64 / dist.sample_size as f64 * 100.0;
        table.row(vec![
            b.bucket.label().to_string(),
            b.count.to_string(),
            format!("{share:.1}%"),
        ]);
    }
    format!(
        "R-Multiple Distribution\n\n1R = {}  average {:.2}R over {} trades\n\n{}",
        fmt_currency(dist.avg_loss_abs),
        dist.average_r,
        dist.sample_size,
        table.render()
    )
}

pub fn render_rolling(window: usize, points: &[RollingPoint]) -> String {
    let title = format!("Rolling Performance ({window}-trade window)");
    if points.is_empty() {
        return format!("{title}\n\nNo closed trades.\n");
    }
    let mut table = Table::new(&["#", "Time", "Window", "Win Rate", "Avg PnL"]);
    for p in points {
        table.row(vec![
            p.index.to_string(),
            p.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            p.window_len.to_string(),
            format!("{:.1}%", p.rolling_win_rate),
            fmt_currency(p.rolling_avg_pnl),
        ]);
    }
    format!("{title}\n\n{}", table.render())
}

pub fn render_markets(rows: &[MarketPerformance]) -> String {
    if rows.is_empty() {
        return "Performance by Market\n\nNo closed trades.\n".to_string();
    }
    let mut table = Table::new(&["Market", "Pair", "Trades", "PnL", "Volume"]);
    for r in rows {
        table.row(vec![
            r.market.clone(),
            r.full_market.clone(),
            r.trades.to_string(),
            fmt_currency(r.pnl),
            fmt_currency(r.volume),
        ]);
    }
    format!("Performance by Market\n\n{}", table.render())
}

pub fn render_fees(rows: &[MarketFees]) -> String {
    if rows.is_empty() {
        return "Fees by Asset\n\nNo trades.\n".to_string();
    }
    let mut table = Table::new(&["Asset", "Trading", "Funding", "Total"]);
    for r in rows {
        table.row(vec![
            r.market.clone(),
            fmt_currency(r.trading),
            fmt_currency(r.funding),
            fmt_currency(r.total),
        ]);
    }
    format!("Fees by Asset\n\n{}", table.render())
}

pub fn render_exposure(rows: &[MarketExposure]) -> String {
    if rows.is_empty() {
        return "Open Exposure\n\nNo open positions.\n".to_string();
    }
    let mut table = Table::new(&["Market", "Positions", "Notional", "Share"]);
    for r in rows {
        table.row(vec![
            r.market.clone(),
            r.positions.to_string(),
            fmt_currency(r.notional),
            format!("{:.1}%", r.percent),
        ]);
    }
    format!("Open Exposure\n\n{}", table.render())
}

pub fn render_order_types(counts: &OrderTypeCounts) -> String {
    let total = counts.market + counts.limit;
    let share = |n: usize| {
        if total == 0 {
            0.0
        } else {
            n as f64 / total as f64 * 100.0
        }
    };
    let mut table = Table::new(&["Order Type", "Trades", "Share"]);
    table.row(vec![
        "market".into(),
        counts.market.to_string(),
        format!("{:.1}%", share(counts.market)),
    ]);
    table.row(vec![
        "limit".into(),
        counts.limit.to_string(),
        format!("{:.1}%", share(counts.limit)),
    ]);
    format!("Order Types\n\n{}", table.render())
}

pub fn render_goals(goals: &Goals, progress: &GoalProgress) -> String {
    let limit = |v: Option<String>| v.unwrap_or_else(|| "off".to_string());
    let flag = |hit: bool| if hit { "REACHED" } else { "ok" }.to_string();

    let mut table = Table::new(&["Goal", "Limit", "Today", "Status"]);
    table.row(vec![
        "Trades per day".into(),
        limit(goals.max_trades_per_day.map(|v| v.to_string())),
        progress.trades_today.to_string(),
        flag(progress.trades_limit_reached),
    ]);
    table.row(vec![
        "Loss per day".into(),
        limit(goals.max_loss_per_day.map(fmt_currency)),
        fmt_currency(progress.pnl_today),
        flag(progress.loss_limit_breached),
    ]);
    table.row(vec![
        "Target R per trade".into(),
        limit(goals.target_r_per_trade.map(|v| format!("{v:.2}R"))),
        "-".into(),
        "-".into(),
    ]);
    format!("Daily Goals for {}\n\n{}", progress.date, table.render())
}

pub fn render_insight(insight: &Insight) -> String {
    let marker = match insight.tone {
        Tone::Positive => "+",
        Tone::Caution => "!",
        Tone::Neutral => "*",
    };
    format!("[{marker}] {}\n\n{}\n", insight.title, insight.message)
}
