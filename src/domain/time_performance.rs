//! Per-period performance of closed trades (calendar day, hour of day, weekday).
//!
//! Bucket keys are computed from calendar fields in a caller-chosen time zone.
//! [`calculate_time_performance`] uses the process-local zone; pass an explicit
//! zone to [`calculate_time_performance_in`] when trades span several zones.

use super::error::JournalError;
use super::trade::Trade;
use chrono::{Datelike, Local, NaiveDate, TimeZone, Timelike, Weekday};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Day,
    Hour,
    Weekday,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePerformance {
    /// `2024-01-15`, `09:00` or `Monday` depending on the grouping.
    pub period: String,
    pub trades: usize,
    pub pnl: f64,
    pub win_rate: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DayStats {
    pub trades: usize,
    pub pnl: f64,
}

pub fn calculate_time_performance(trades: &[Trade], group_by: GroupBy) -> Vec<TimePerformance> {
    calculate_time_performance_in(trades, group_by, &Local)
}

/// Groups closed trades by period key in `tz`. Only non-empty buckets are
/// returned, in order of first occurrence.
pub fn calculate_time_performance_in<Tz: TimeZone>(
    trades: &[Trade],
    group_by: GroupBy,
    tz: &Tz,
) -> Vec<TimePerformance> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&Trade>)> = Vec::new();

    for trade in trades.iter().filter(|t| t.is_closed()) {
        let key = period_key(trade, group_by, tz);
        match index.get(&key) {
            Some(&i) => groups[i].1.push(trade),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![trade]));
            }
        }
    }

    groups
        .into_iter()
        .map(|(period, bucket)| summarize(period, &bucket))
        .collect()
}

/// Exactly 24 hourly records `00:00`..`23:00`, zero-filled where `hourly`
/// has no entry.
pub fn backfill_hours(hourly: &[TimePerformance]) -> Vec<TimePerformance> {
    (0..24)
        .map(|hour| {
            let period = hour_label(hour);
            hourly
                .iter()
                .find(|p| p.period == period)
                .cloned()
                .unwrap_or_else(|| TimePerformance {
                    period,
                    trades: 0,
                    pnl: 0.0,
                    win_rate: 0.0,
                    volume: 0.0,
                })
        })
        .collect()
}

/// Closed-trade count and PnL for one calendar day in `tz`.
pub fn day_stats<Tz: TimeZone>(trades: &[Trade], date: NaiveDate, tz: &Tz) -> DayStats {
    let key = day_label(date);
    calculate_time_performance_in(trades, GroupBy::Day, tz)
        .into_iter()
        .find(|p| p.period == key)
        .map(|p| DayStats {
            trades: p.trades,
            pnl: p.pnl,
        })
        .unwrap_or_default()
}

fn period_key<Tz: TimeZone>(trade: &Trade, group_by: GroupBy, tz: &Tz) -> String {
    let local = trade.timestamp.with_timezone(tz);
    match group_by {
        GroupBy::Day => day_label(local.date_naive()),
        GroupBy::Hour => hour_label(local.hour()),
        GroupBy::Weekday => weekday_name(local.weekday()).to_string(),
    }
}

fn summarize(period: String, bucket: &[&Trade]) -> TimePerformance {
    let pnl = bucket.iter().map(|t| t.pnl_or_zero()).sum();
    let winners = bucket.iter().filter(|t| t.pnl_or_zero() > 0.0).count();
    let win_rate = if bucket.is_empty() {
        0.0
    } else {
        winners as f64 / bucket.len() as f64 * 100.0
    };
    let volume = bucket.iter().map(|t| t.notional()).sum();

    TimePerformance {
        period,
        trades: bucket.len(),
        pnl,
        win_rate,
        volume,
    }
}

fn day_label(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn hour_label(hour: u32) -> String {
    format!("{hour:02}:00")
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupBy::Day => write!(f, "day"),
            GroupBy::Hour => write!(f, "hour"),
            GroupBy::Weekday => write!(f, "weekday"),
        }
    }
}

impl FromStr for GroupBy {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(GroupBy::Day),
            "hour" => Ok(GroupBy::Hour),
            "weekday" => Ok(GroupBy::Weekday),
            _ => Err(JournalError::parse("grouping", s)),
        }
    }
}
