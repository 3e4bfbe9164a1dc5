//! CSV trade history adapter.
//!
//! Columns are addressed by header name, so their order in the file does not
//! matter. Row numbers in errors count data rows from 1; header problems are
//! reported as row 0.

use crate::domain::error::JournalError;
use crate::domain::trade::{Fees, MarketType, OrderType, Trade};
use crate::ports::trade_port::TradePort;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

const REQUIRED_COLUMNS: [&str; 13] = [
    "id",
    "timestamp",
    "market",
    "side",
    "entry_price",
    "exit_price",
    "quantity",
    "leverage",
    "pnl",
    "trading_fee",
    "funding_fee",
    "status",
    "duration",
];

const ANNOTATION_SEPARATOR: char = '|';

pub struct CsvTradeAdapter {
    path: PathBuf,
}

impl CsvTradeAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TradePort for CsvTradeAdapter {
    fn fetch_trades(&self) -> Result<Vec<Trade>, JournalError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;
        read_trades(reader)
    }

    fn describe(&self) -> String {
        format!("csv file {}", self.path.display())
    }
}

/// Reads every record, then orders the result chronologically.
pub fn read_trades<R: std::io::Read>(
    mut reader: csv::Reader<R>,
) -> Result<Vec<Trade>, JournalError> {
    let columns = Columns::from_headers(reader.headers()?)?;

    let mut trades = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = i + 1;
        let record = result?;
        trades.push(columns.parse_trade(&record, row)?);
    }

    trades.sort_by_key(|t| t.timestamp);
    Ok(trades)
}

struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, JournalError> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_lowercase(), i))
            .collect();

        if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !index.contains_key(**c)) {
            return Err(JournalError::TradeData {
                row: 0,
                reason: format!("missing column {missing:?}"),
            });
        }
        Ok(Self { index })
    }

    /// Cell text, or `None` when the column is absent or the cell is empty.
    fn cell<'r>(&self, record: &'r csv::StringRecord, name: &str) -> Option<&'r str> {
        self.index
            .get(name)
            .and_then(|&i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn required<'r>(
        &self,
        record: &'r csv::StringRecord,
        name: &str,
        row: usize,
    ) -> Result<&'r str, JournalError> {
        self.cell(record, name).ok_or_else(|| JournalError::TradeData {
            row,
            reason: format!("missing {name}"),
        })
    }

    fn parsed<T: FromStr>(
        &self,
        record: &csv::StringRecord,
        name: &str,
        row: usize,
    ) -> Result<Option<T>, JournalError> {
        self.cell(record, name)
            .map(|raw| {
                raw.parse::<T>().map_err(|_| JournalError::TradeData {
                    row,
                    reason: format!("invalid {name} {raw:?}"),
                })
            })
            .transpose()
    }

    fn number(
        &self,
        record: &csv::StringRecord,
        name: &str,
        row: usize,
    ) -> Result<Option<f64>, JournalError> {
        match self.parsed::<f64>(record, name, row)? {
            Some(v) if !v.is_finite() => Err(JournalError::TradeData {
                row,
                reason: format!("{name} must be finite"),
            }),
            other => Ok(other),
        }
    }

    fn parse_trade(&self, record: &csv::StringRecord, row: usize) -> Result<Trade, JournalError> {
        let id = self.required(record, "id", row)?.to_string();

        let raw_ts = self.required(record, "timestamp", row)?;
        let timestamp = DateTime::parse_from_rfc3339(raw_ts)
            .map_err(|e| JournalError::TradeData {
                row,
                reason: format!("invalid timestamp {raw_ts:?}: {e}"),
            })?
            .with_timezone(&Utc);

        let market = self.required(record, "market", row)?.to_string();
        let side = self.enum_cell(record, "side", row)?;
        let status = self.enum_cell(record, "status", row)?;
        let market_type = self
            .parsed::<MarketType>(record, "market_type", row)?
            .unwrap_or(MarketType::Perpetual);
        let order_type = self
            .parsed::<OrderType>(record, "order_type", row)?
            .unwrap_or(OrderType::Market);

        let entry_price = self
            .number(record, "entry_price", row)?
            .ok_or_else(|| JournalError::TradeData {
                row,
                reason: "missing entry_price".into(),
            })?;
        let quantity = self
            .number(record, "quantity", row)?
            .ok_or_else(|| JournalError::TradeData {
                row,
                reason: "missing quantity".into(),
            })?;
        if entry_price < 0.0 || quantity < 0.0 {
            return Err(JournalError::TradeData {
                row,
                reason: "entry_price and quantity must be non-negative".into(),
            });
        }

        let annotations = self
            .cell(record, "annotations")
            .map(|raw| {
                raw.split(ANNOTATION_SEPARATOR)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Trade {
            id,
            tx_signature: self.cell(record, "tx_signature").unwrap_or_default().to_string(),
            timestamp,
            market,
            market_type,
            side,
            order_type,
            entry_price,
            exit_price: self.number(record, "exit_price", row)?,
            quantity,
            leverage: self.number(record, "leverage", row)?,
            pnl: self.number(record, "pnl", row)?,
            pnl_percent: self.number(record, "pnl_percent", row)?,
            fees: Fees {
                trading: self.number(record, "trading_fee", row)?.unwrap_or(0.0),
                funding: self.number(record, "funding_fee", row)?.unwrap_or(0.0),
            },
            status,
            duration: self.parsed::<u64>(record, "duration", row)?,
            annotations,
        })
    }

    fn enum_cell<T>(
        &self,
        record: &csv::StringRecord,
        name: &str,
        row: usize,
    ) -> Result<T, JournalError>
    where
        T: FromStr<Err = JournalError>,
    {
        let raw = self.required(record, name, row)?;
        raw.parse::<T>().map_err(|e| JournalError::TradeData {
            row,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::{Side, TradeStatus};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "id,tx_signature,timestamp,market,market_type,side,order_type,entry_price,exit_price,quantity,leverage,pnl,pnl_percent,trading_fee,funding_fee,status,duration,annotations";

    fn write_csv(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file
    }

    fn load(file: &NamedTempFile) -> Result<Vec<Trade>, JournalError> {
        CsvTradeAdapter::new(file.path().to_path_buf()).fetch_trades()
    }

    #[test]
    fn parses_full_rows_and_sorts_by_time() {
        let file = write_csv(&[
            "t2,sig2,2024-03-02T10:00:00Z,BTC-USDC,spot,short,limit,50000,49000,0.1,,100,2,5,0,closed,3600,fomo|late entry",
            "t1,sig1,2024-03-01T08:30:00+02:00,SOL-USDC,perpetual,long,market,100,,2,3,,,0.2,-0.05,open,,",
        ]);
        let trades = load(&file).unwrap();

        assert_eq!(trades.len(), 2);
        let first = &trades[0];
        assert_eq!(first.id, "t1");
        assert_eq!(first.timestamp.to_rfc3339(), "2024-03-01T06:30:00+00:00");
        assert_eq!(first.side, Side::Long);
        assert_eq!(first.status, TradeStatus::Open);
        assert_eq!(first.exit_price, None);
        assert_eq!(first.leverage, Some(3.0));
        assert_eq!(first.pnl, None);
        assert_eq!(first.fees.funding, -0.05);
        assert_eq!(first.duration, None);
        assert!(first.annotations.is_empty());

        let second = &trades[1];
        assert_eq!(second.market_type, MarketType::Spot);
        assert_eq!(second.order_type, OrderType::Limit);
        assert_eq!(second.exit_price, Some(49_000.0));
        assert_eq!(second.pnl, Some(100.0));
        assert_eq!(second.duration, Some(3600));
        assert_eq!(second.annotations, vec!["fomo", "late entry"]);
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "status,id,timestamp,market,side,entry_price,exit_price,quantity,leverage,pnl,trading_fee,funding_fee,duration"
        )
        .unwrap();
        writeln!(file, "closed,a,2024-01-01T00:00:00Z,ETH-USDC,long,10,11,1,,1,,,60").unwrap();

        let trades = load(&file).unwrap();
        let t = &trades[0];
        assert_eq!(t.tx_signature, "");
        assert_eq!(t.market_type, MarketType::Perpetual);
        assert_eq!(t.order_type, OrderType::Market);
        assert_eq!(t.pnl_percent, None);
        assert_eq!(t.fees, Fees::default());
    }

    #[test]
    fn missing_required_column_is_header_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "id,timestamp,market").unwrap();
        let err = load(&file).unwrap_err();
        assert!(matches!(err, JournalError::TradeData { row: 0, .. }));
    }

    #[test]
    fn bad_cell_reports_data_row() {
        let file = write_csv(&[
            "a,,2024-01-01T00:00:00Z,SOL-USDC,,long,,100,101,1,,1,,,,closed,60,",
            "b,,2024-01-01T01:00:00Z,SOL-USDC,,sideways,,100,101,1,,1,,,,closed,60,",
        ]);
        let err = load(&file).unwrap_err();
        match err {
            JournalError::TradeData { row, reason } => {
                assert_eq!(row, 2);
                assert!(reason.contains("sideways"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn bad_timestamp_and_number() {
        let file = write_csv(&["a,,yesterday,SOL-USDC,,long,,100,101,1,,1,,,,closed,60,"]);
        assert!(matches!(load(&file).unwrap_err(), JournalError::TradeData { row: 1, .. }));

        let file = write_csv(&["a,,2024-01-01T00:00:00Z,SOL-USDC,,long,,abc,101,1,,1,,,,closed,60,"]);
        let err = load(&file).unwrap_err();
        assert!(matches!(
            err,
            JournalError::TradeData { ref reason, .. } if reason.contains("entry_price")
        ));
    }

    #[test]
    fn missing_file_is_csv_error() {
        let adapter = CsvTradeAdapter::new(PathBuf::from("/nonexistent/trades.csv"));
        assert!(matches!(adapter.fetch_trades().unwrap_err(), JournalError::Csv(_)));
        assert!(adapter.describe().contains("/nonexistent/trades.csv"));
    }

    #[test]
    fn header_only_file_is_empty() {
        let file = write_csv(&[]);
        assert!(load(&file).unwrap().is_empty());
    }
}
