//! Rule-based coaching insight derived from analytics, goals and recent trades.
//!
//! Rules are checked in priority order and the first match wins.

use super::analytics::PortfolioAnalytics;
use super::goals::Goals;
use super::r_multiple::expectancy_r;
use super::time_performance::day_stats;
use super::trade::{sorted_by_time, Trade};
use chrono::{NaiveDate, TimeZone};
use serde::Serialize;

pub const MIN_SAMPLE: usize = 10;
pub const RECENT_WINDOW: usize = 10;
const STRONG_RECENT_WIN_RATE: f64 = 60.0;
const POSITIVE_EDGE_R: f64 = 0.3;
const DEEP_DRAWDOWN_PCT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Caution,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub tone: Tone,
    pub title: String,
    pub message: String,
}

impl Insight {
    fn new(tone: Tone, title: &str, message: impl Into<String>) -> Self {
        Insight {
            tone,
            title: title.to_string(),
            message: message.into(),
        }
    }
}

pub struct CoachingContext<'a> {
    /// Analytics over the full history, if computed.
    pub analytics: Option<&'a PortfolioAnalytics>,
    /// Full history; daily limits are checked against this.
    pub trades: &'a [Trade],
    /// The filtered view the user is looking at.
    pub filtered: &'a [Trade],
    pub goals: &'a Goals,
    pub today: NaiveDate,
}

pub fn coaching_insight<Tz: TimeZone>(ctx: &CoachingContext<'_>, tz: &Tz) -> Insight {
    let analytics = match ctx.analytics {
        Some(a) if !ctx.trades.is_empty() => a,
        _ => {
            return Insight::new(
                Tone::Neutral,
                "Start building your sample",
                "After 20 to 30 closed trades this insight will start pointing out \
                 patterns in your performance and discipline.",
            );
        }
    };

    let closed: Vec<&Trade> = ctx
        .filtered
        .iter()
        .filter(|t| t.is_closed() && t.pnl.is_some())
        .collect();

    if closed.len() < MIN_SAMPLE {
        return Insight::new(
            Tone::Neutral,
            "Sample is still small",
            format!(
                "There are fewer than {MIN_SAMPLE} closed trades in this view. Execute your \
                 plan consistently before reading too much into the statistics."
            ),
        );
    }

    let today = day_stats(ctx.trades, ctx.today, tz);

    if let Some(max_trades) = ctx.goals.max_trades_per_day {
        if max_trades > 0 && today.trades > max_trades as usize {
            return Insight::new(
                Tone::Caution,
                "You may be overtrading today",
                "You are past your own daily trade limit. Pause and review instead of \
                 looking for more entries.",
            );
        }
    }

    if let Some(max_loss) = ctx.goals.max_loss_per_day {
        if max_loss > 0.0 && today.pnl <= -max_loss.abs() {
            return Insight::new(
                Tone::Caution,
                "Daily loss limit is hit",
                "You are beyond your planned daily loss. Stop here and protect capital \
                 rather than trying to win it back immediately.",
            );
        }
    }

    let recent = sorted_by_time(closed.iter().copied());
    let recent = &recent[recent.len().saturating_sub(RECENT_WINDOW)..];
    let recent_pnl: f64 = recent.iter().map(|t| t.pnl_or_zero()).sum();
    let recent_wins = recent.iter().filter(|t| t.pnl_or_zero() > 0.0).count();
    let recent_win_rate = if recent.is_empty() {
        0.0
    } else {
        recent_wins as f64 / recent.len() as f64 * 100.0
    };

    if recent_win_rate >= STRONG_RECENT_WIN_RATE && recent_pnl > 0.0 {
        return Insight::new(
            Tone::Positive,
            "Your recent execution looks strong",
            format!(
                "Your win rate over the last {} closed trades in this view is about {:.0}%. \
                 Keep the same process and resist sizing up too quickly.",
                recent.len(),
                recent_win_rate
            ),
        );
    }

    let edge_r = expectancy_r(ctx.filtered);

    if edge_r > POSITIVE_EDGE_R {
        return Insight::new(
            Tone::Positive,
            "Your system has a positive edge",
            format!(
                "Average expectancy is roughly {edge_r:.2}R per trade. Concentrate on position \
                 sizing and on avoiding trades outside your plan."
            ),
        );
    }

    if let Some(target) = ctx.goals.target_r_per_trade {
        if target > 0.0 && edge_r > 0.0 && edge_r < target {
            return Insight::new(
                Tone::Neutral,
                "Edge is positive but below your goal",
                format!(
                    "Expectancy is about {edge_r:.2}R per trade against a target of \
                     {target:.2}R. Look for better trade selection or reward-to-risk, \
                     not more trades."
                ),
            );
        }
    }

    if analytics.current_drawdown > 0.0 && analytics.max_drawdown > 0.0 {
        let share_of_max = analytics.current_drawdown / analytics.max_drawdown * 100.0;
        if share_of_max >= DEEP_DRAWDOWN_PCT {
            return Insight::new(
                Tone::Caution,
                "Deep in a drawdown",
                "You are near your largest historical drawdown. Reduce size, be selective \
                 and follow your rules closely.",
            );
        }
    }

    Insight::new(
        Tone::Neutral,
        "Let the data guide your rules",
        "Use the hourly, weekday and R-multiple breakdowns to set clear rules on when \
         you trade, how often, and which setups to skip.",
    )
}
