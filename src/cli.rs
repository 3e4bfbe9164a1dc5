//! CLI definition and dispatch.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};

use crate::adapters::console_report::{Report, ReportFormat};
use crate::adapters::csv_adapter::CsvTradeAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::mock_adapter::MockTradeAdapter;
use crate::domain::analytics::calculate_analytics;
use crate::domain::breakdown::{
    exposure_breakdown, fee_breakdown, market_breakdown, order_type_counts,
};
use crate::domain::coaching::{coaching_insight, CoachingContext, Insight};
use crate::domain::error::JournalError;
use crate::domain::filter::{apply_filters, TradeFilters};
use crate::domain::goals::{evaluate_goals, GoalProgress};
use crate::domain::pnl_series::generate_pnl_chart_data;
use crate::domain::r_multiple::compute_r_distribution;
use crate::domain::rolling::rolling_performance;
use crate::domain::settings::{build_settings, DataSource, JournalSettings, Zone};
use crate::domain::time_performance::{
    backfill_hours, calculate_time_performance_in, GroupBy, TimePerformance,
};
use crate::domain::trade::Trade;
use crate::ports::trade_port::TradePort;

#[derive(Parser, Debug)]
#[command(name = "tradejournal", about = "Trading journal performance analytics")]
pub struct Cli {
    /// INI settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Read trades from a CSV file
    #[arg(long, conflicts_with = "mock")]
    pub trades: Option<PathBuf>,

    /// Use generated mock trades
    #[arg(long)]
    pub mock: bool,

    /// Number of mock trades
    #[arg(long)]
    pub count: Option<usize>,

    /// Seed for reproducible mock trades
    #[arg(long)]
    pub seed: Option<u64>,

    /// Starting capital used for percentages and equity
    #[arg(long)]
    pub capital: Option<f64>,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Raw filter flags; parsed into [`TradeFilters`] once the time zone is known.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Only this market (repeatable)
    #[arg(long = "market")]
    pub markets: Vec<String>,

    /// long or short (repeatable)
    #[arg(long = "side")]
    pub sides: Vec<String>,

    /// open, closed or liquidated (repeatable)
    #[arg(long = "status")]
    pub statuses: Vec<String>,

    /// market or limit (repeatable)
    #[arg(long = "order-type")]
    pub order_types: Vec<String>,

    /// Start date, YYYY-MM-DD or RFC 3339 (inclusive)
    #[arg(long)]
    pub from: Option<String>,

    /// End date, YYYY-MM-DD or RFC 3339 (inclusive)
    #[arg(long)]
    pub to: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub min_pnl: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub max_pnl: Option<f64>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Portfolio statistics
    Summary,
    /// Equity, cumulative PnL and drawdown per closed trade
    Equity,
    /// Performance by day, hour or weekday
    Periods {
        #[arg(long)]
        group_by: Option<String>,
        /// Show all 24 hours when grouping by hour
        #[arg(long)]
        fill_hours: bool,
    },
    /// Distribution of trade outcomes in R units
    RMultiples,
    /// Trailing win rate and average PnL
    Rolling {
        #[arg(long)]
        window: Option<usize>,
    },
    /// PnL and volume per market
    Markets,
    /// Trading and funding fees per asset
    Fees,
    /// Open position exposure per market
    Exposure,
    /// Market vs limit order counts
    OrderTypes,
    /// Today's progress against daily goals
    Goals,
    /// One coaching insight for the current view
    Coach,
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::from(&err)
        }
    }
}

/// Loads settings and trades, applies filters and renders the command's
/// report.
pub fn execute(cli: &Cli) -> Result<String, JournalError> {
    // Stage 1: settings
    let settings = load_settings(cli)?;
    info!(
        capital = settings.initial_capital,
        zone = ?settings.zone,
        "settings loaded"
    );

    // Stage 2: trades
    let port = trade_port(&settings.data);
    let trades = port.fetch_trades()?;
    info!(count = trades.len(), source = %port.describe(), "trades loaded");

    // Stage 3: filters
    let filters = build_filters(&cli.filters, settings.zone)?;
    let filtered = if filters.is_empty() {
        trades.clone()
    } else {
        debug!(?filters, "applying filters");
        apply_filters(&trades, &filters)
    };
    if filtered.is_empty() {
        warn!("no trades match the current selection");
    } else {
        debug!(count = filtered.len(), "trades selected");
    }

    // Stage 4: analytics and rendering
    render_command(&cli.command, &settings, &trades, &filtered, cli.format)
}

pub fn load_settings(cli: &Cli) -> Result<JournalSettings, JournalError> {
    let mut settings = match &cli.config {
        Some(path) => {
            info!("loading config from {}", path.display());
            let adapter = FileConfigAdapter::from_file(path)?;
            build_settings(&adapter)?
        }
        None => JournalSettings::default(),
    };

    if let Some(path) = &cli.trades {
        settings.data = DataSource::Csv { path: path.clone() };
    } else if cli.mock && !matches!(settings.data, DataSource::Mock { .. }) {
        settings.data = DataSource::default();
    }
    if let DataSource::Mock { count, seed, .. } = &mut settings.data {
        if let Some(n) = cli.count {
            *count = n;
        }
        if cli.seed.is_some() {
            *seed = cli.seed;
        }
    }

    if let Some(capital) = cli.capital {
        if !capital.is_finite() || capital <= 0.0 {
            return Err(JournalError::parse("capital", capital.to_string()));
        }
        settings.initial_capital = capital;
    }

    if let Command::Rolling {
        window: Some(window),
    } = &cli.command
    {
        settings.rolling_window = (*window).max(1);
    }
    if let Command::Periods {
        group_by: Some(raw),
        ..
    } = &cli.command
    {
        settings.group_by = raw.parse()?;
    }

    Ok(settings)
}

fn trade_port(data: &DataSource) -> Box<dyn TradePort> {
    match data {
        DataSource::Csv { path } => Box::new(CsvTradeAdapter::new(path.clone())),
        DataSource::Mock { count, seed, days } => {
            Box::new(MockTradeAdapter::new(*count, *seed, *days))
        }
    }
}

pub fn build_filters(args: &FilterArgs, zone: Zone) -> Result<TradeFilters, JournalError> {
    Ok(TradeFilters {
        start: args
            .from
            .as_deref()
            .map(|raw| parse_bound(raw, zone, false))
            .transpose()?,
        end: args
            .to
            .as_deref()
            .map(|raw| parse_bound(raw, zone, true))
            .transpose()?,
        markets: args.markets.clone(),
        sides: parse_all(&args.sides)?,
        statuses: parse_all(&args.statuses)?,
        order_types: parse_all(&args.order_types)?,
        min_pnl: args.min_pnl,
        max_pnl: args.max_pnl,
    })
}

fn parse_all<T>(raw: &[String]) -> Result<Vec<T>, JournalError>
where
    T: std::str::FromStr<Err = JournalError>,
{
    raw.iter().map(|s| s.parse()).collect()
}

/// RFC 3339 instants are taken as-is. A bare date covers the whole calendar
/// day in `zone`: its first instant for a lower bound, its last for an upper.
pub fn parse_bound(
    raw: &str,
    zone: Zone,
    end_of_day: bool,
) -> Result<DateTime<Utc>, JournalError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw.trim()) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| JournalError::parse("date", raw))?;
    let time = if end_of_day {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| JournalError::parse("date", raw))?;
    let naive = date.and_time(time);

    let resolved = match zone {
        Zone::Local => to_utc(Local.from_local_datetime(&naive), end_of_day),
        Zone::Fixed(offset) => to_utc(offset.from_local_datetime(&naive), end_of_day),
    };
    resolved.ok_or_else(|| JournalError::parse("date", raw))
}

fn to_utc<Tz: TimeZone>(
    local: chrono::LocalResult<DateTime<Tz>>,
    latest: bool,
) -> Option<DateTime<Utc>> {
    let pick = match local {
        chrono::LocalResult::Single(dt) => dt,
        chrono::LocalResult::Ambiguous(early, late) => {
            if latest {
                late
            } else {
                early
            }
        }
        chrono::LocalResult::None => return None,
    };
    Some(pick.with_timezone(&Utc))
}

fn today(zone: Zone) -> NaiveDate {
    match zone {
        Zone::Local => Local::now().date_naive(),
        Zone::Fixed(offset) => Utc::now().with_timezone(&offset).date_naive(),
    }
}

fn periods(trades: &[Trade], group_by: GroupBy, zone: Zone) -> Vec<TimePerformance> {
    match zone {
        Zone::Local => calculate_time_performance_in(trades, group_by, &Local),
        Zone::Fixed(offset) => calculate_time_performance_in(trades, group_by, &offset),
    }
}

fn goal_progress(trades: &[Trade], settings: &JournalSettings, day: NaiveDate) -> GoalProgress {
    match settings.zone {
        Zone::Local => evaluate_goals(trades, &settings.goals, day, &Local),
        Zone::Fixed(offset) => evaluate_goals(trades, &settings.goals, day, &offset),
    }
}

fn insight(ctx: &CoachingContext<'_>, zone: Zone) -> Insight {
    match zone {
        Zone::Local => coaching_insight(ctx, &Local),
        Zone::Fixed(offset) => coaching_insight(ctx, &offset),
    }
}

/// `trades` is the full history, `filtered` the selected view. Daily goals
/// and the coach's drawdown check always look at the full history.
pub fn render_command(
    command: &Command,
    settings: &JournalSettings,
    trades: &[Trade],
    filtered: &[Trade],
    format: ReportFormat,
) -> Result<String, JournalError> {
    let capital = settings.initial_capital;

    match command {
        Command::Summary => {
            let analytics = calculate_analytics(filtered, capital);
            Report::Summary(&analytics).render(format)
        }
        Command::Equity => {
            let points = generate_pnl_chart_data(filtered, capital);
            Report::Equity(&points).render(format)
        }
        Command::Periods { fill_hours, .. } => {
            let mut rows = periods(filtered, settings.group_by, settings.zone);
            if *fill_hours && settings.group_by == GroupBy::Hour {
                rows = backfill_hours(&rows);
            }
            Report::Periods {
                group_by: settings.group_by,
                rows: &rows,
            }
            .render(format)
        }
        Command::RMultiples => {
            let dist = compute_r_distribution(filtered);
            if dist.is_none() {
                warn!("no losing closed trades; R unit undefined");
            }
            Report::RMultiples(dist.as_ref()).render(format)
        }
        Command::Rolling { .. } => {
            let points = rolling_performance(filtered, settings.rolling_window);
            Report::Rolling {
                window: settings.rolling_window,
                points: &points,
            }
            .render(format)
        }
        Command::Markets => Report::Markets(&market_breakdown(filtered)).render(format),
        Command::Fees => Report::Fees(&fee_breakdown(filtered)).render(format),
        Command::Exposure => Report::Exposure(&exposure_breakdown(filtered)).render(format),
        Command::OrderTypes => Report::OrderTypes(&order_type_counts(filtered)).render(format),
        Command::Goals => {
            let progress = goal_progress(trades, settings, today(settings.zone));
            Report::Goals {
                goals: &settings.goals,
                progress: &progress,
            }
            .render(format)
        }
        Command::Coach => {
            let analytics = calculate_analytics(trades, capital);
            let ctx = CoachingContext {
                analytics: Some(&analytics),
                trades,
                filtered,
                goals: &settings.goals,
                today: today(settings.zone),
            };
            Report::Coach(&insight(&ctx, settings.zone)).render(format)
        }
    }
}
