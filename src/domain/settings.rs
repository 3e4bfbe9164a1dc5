//! Journal settings read from an INI file, with validation.
//!
//! ```ini
//! [data]
//! source = csv            ; csv | mock
//! trades_path = trades.csv
//! mock_count = 100
//! mock_seed = 42
//! mock_days = 30
//!
//! [analytics]
//! initial_capital = 10000
//! rolling_window = 20
//! group_by = hour
//! utc_offset = +02:00
//!
//! [goals]
//! max_trades_per_day = 10
//! max_loss_per_day = 200
//! target_r_per_trade = 0.3
//! ```

use crate::domain::analytics::DEFAULT_INITIAL_CAPITAL;
use crate::domain::error::JournalError;
use crate::domain::goals::{
    Goals, DEFAULT_MAX_LOSS_PER_DAY, DEFAULT_MAX_TRADES_PER_DAY, DEFAULT_TARGET_R_PER_TRADE,
};
use crate::domain::rolling::DEFAULT_ROLLING_WINDOW;
use crate::domain::time_performance::GroupBy;
use crate::ports::config_port::ConfigPort;
use chrono::FixedOffset;
use std::path::PathBuf;

pub const DEFAULT_MOCK_COUNT: usize = 100;
pub const DEFAULT_MOCK_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Csv {
        path: PathBuf,
    },
    Mock {
        count: usize,
        seed: Option<u64>,
        days: u32,
    },
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Mock {
            count: DEFAULT_MOCK_COUNT,
            seed: None,
            days: DEFAULT_MOCK_DAYS,
        }
    }
}

/// Time zone used for calendar bucketing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Zone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JournalSettings {
    pub data: DataSource,
    pub initial_capital: f64,
    pub rolling_window: usize,
    pub group_by: GroupBy,
    pub zone: Zone,
    pub goals: Goals,
}

impl Default for JournalSettings {
    fn default() -> Self {
        JournalSettings {
            data: DataSource::default(),
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            rolling_window: DEFAULT_ROLLING_WINDOW,
            group_by: GroupBy::default(),
            zone: Zone::default(),
            goals: Goals::default(),
        }
    }
}

pub fn build_settings(config: &dyn ConfigPort) -> Result<JournalSettings, JournalError> {
    Ok(JournalSettings {
        data: build_data_source(config)?,
        initial_capital: initial_capital(config)?,
        rolling_window: rolling_window(config)?,
        group_by: group_by(config)?,
        zone: zone(config)?,
        goals: goals(config)?,
    })
}

fn build_data_source(config: &dyn ConfigPort) -> Result<DataSource, JournalError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "mock".to_string());

    match source.trim().to_lowercase().as_str() {
        "csv" => {
            let path = config
                .get_string("data", "trades_path")
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| JournalError::ConfigMissing {
                    section: "data".into(),
                    key: "trades_path".into(),
                })?;
            Ok(DataSource::Csv {
                path: PathBuf::from(path.trim()),
            })
        }
        "mock" => {
            let count = int_or(config, "data", "mock_count", DEFAULT_MOCK_COUNT as i64)?;
            let count = usize::try_from(count).map_err(|_| {
                JournalError::config_invalid(
                    "data",
                    "mock_count",
                    "mock_count must be non-negative",
                )
            })?;

            let seed = match config.get_int_opt("data", "mock_seed") {
                None => None,
                Some(Ok(v)) if v >= 0 => Some(v as u64),
                Some(_) => {
                    return Err(JournalError::config_invalid(
                        "data",
                        "mock_seed",
                        "mock_seed must be a non-negative integer",
                    ));
                }
            };

            let days = int_or(config, "data", "mock_days", i64::from(DEFAULT_MOCK_DAYS))?;
            let days = u32::try_from(days).ok().filter(|&d| d > 0).ok_or_else(|| {
                JournalError::config_invalid("data", "mock_days", "mock_days must be positive")
            })?;

            Ok(DataSource::Mock { count, seed, days })
        }
        other => Err(JournalError::config_invalid(
            "data",
            "source",
            format!("unknown source {other:?} (expected csv or mock)"),
        )),
    }
}

fn initial_capital(config: &dyn ConfigPort) -> Result<f64, JournalError> {
    let value = double_or(config, "analytics", "initial_capital", DEFAULT_INITIAL_CAPITAL)?;
    if !value.is_finite() || value <= 0.0 {
        return Err(JournalError::config_invalid(
            "analytics",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(value)
}

fn rolling_window(config: &dyn ConfigPort) -> Result<usize, JournalError> {
    let value = int_or(config, "analytics", "rolling_window", DEFAULT_ROLLING_WINDOW as i64)?;
    if value < 1 {
        return Err(JournalError::config_invalid(
            "analytics",
            "rolling_window",
            "rolling_window must be at least 1",
        ));
    }
    Ok(value as usize)
}

fn group_by(config: &dyn ConfigPort) -> Result<GroupBy, JournalError> {
    match config.get_string("analytics", "group_by") {
        None => Ok(GroupBy::default()),
        Some(raw) => raw.parse().map_err(|_| {
            JournalError::config_invalid(
                "analytics",
                "group_by",
                format!("unknown grouping {raw:?} (expected day, hour or weekday)"),
            )
        }),
    }
}

fn zone(config: &dyn ConfigPort) -> Result<Zone, JournalError> {
    match config
        .get_string("analytics", "utc_offset")
        .filter(|s| !s.trim().is_empty())
    {
        None => Ok(Zone::Local),
        Some(raw) => parse_utc_offset(&raw).map(Zone::Fixed).ok_or_else(|| {
            JournalError::config_invalid(
                "analytics",
                "utc_offset",
                format!("invalid offset {raw:?} (expected e.g. +02:00, -0530 or Z)"),
            )
        }),
    }
}

fn goals(config: &dyn ConfigPort) -> Result<Goals, JournalError> {
    let max_trades = int_or(
        config,
        "goals",
        "max_trades_per_day",
        i64::from(DEFAULT_MAX_TRADES_PER_DAY),
    )?;
    let max_loss = double_or(config, "goals", "max_loss_per_day", DEFAULT_MAX_LOSS_PER_DAY)?;
    let target_r = double_or(config, "goals", "target_r_per_trade", DEFAULT_TARGET_R_PER_TRADE)?;
    Ok(Goals::new(Some(max_trades), Some(max_loss), Some(target_r)))
}

/// Absent keys take `default`; present but non-numeric values are rejected.
fn int_or(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, JournalError> {
    match config.get_int_opt(section, key) {
        None => Ok(default),
        Some(Ok(v)) => Ok(v),
        Some(Err(raw)) => Err(JournalError::config_invalid(
            section,
            key,
            format!("not an integer: {raw:?}"),
        )),
    }
}

fn double_or(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, JournalError> {
    match config.get_double_opt(section, key) {
        None => Ok(default),
        Some(Ok(v)) => Ok(v),
        Some(Err(raw)) => Err(JournalError::config_invalid(
            section,
            key,
            format!("not a number: {raw:?}"),
        )),
    }
}

/// Accepts `Z`, `UTC`, `+HH`, `+HH:MM` and `+HHMM` (sign required otherwise).
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match *s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    if !rest.is_ascii() {
        return None;
    }
    let (hh, mm) = match rest.split_once(':') {
        Some((hh, mm)) => (hh, mm),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "00"),
    };
    if hh.len() != 2 || mm.len() != 2 || !(hh.bytes().chain(mm.bytes())).all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let hours: i32 = hh.parse().ok()?;
    let minutes: i32 = mm.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
