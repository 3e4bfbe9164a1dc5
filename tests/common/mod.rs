#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use tradejournal::domain::error::JournalError;
pub use tradejournal::domain::trade::{Fees, MarketType, OrderType, Side, Trade, TradeStatus};
use tradejournal::ports::trade_port::TradePort;

pub struct MockTradePort {
    pub trades: Vec<Trade>,
    pub error: Option<String>,
}

impl MockTradePort {
    pub fn new() -> Self {
        Self {
            trades: Vec::new(),
            error: None,
        }
    }

    pub fn with_trades(mut self, trades: Vec<Trade>) -> Self {
        self.trades.extend(trades);
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl TradePort for MockTradePort {
    fn fetch_trades(&self) -> Result<Vec<Trade>, JournalError> {
        if let Some(reason) = &self.error {
            return Err(JournalError::TradeData {
                row: 1,
                reason: reason.clone(),
            });
        }
        Ok(self.trades.clone())
    }

    fn describe(&self) -> String {
        format!("{} in-memory trades", self.trades.len())
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// A closed long SOL-USDC trade at entry 100, quantity 1.
pub fn make_trade(id: &str, pnl: f64, timestamp: DateTime<Utc>) -> Trade {
    Trade {
        id: id.to_string(),
        tx_signature: format!("sig-{id}"),
        timestamp,
        market: "SOL-USDC".to_string(),
        market_type: MarketType::Perpetual,
        side: Side::Long,
        order_type: OrderType::Market,
        entry_price: 100.0,
        exit_price: Some(100.0 + pnl),
        quantity: 1.0,
        leverage: None,
        pnl: Some(pnl),
        pnl_percent: Some(pnl),
        fees: Fees::default(),
        status: TradeStatus::Closed,
        duration: Some(600),
        annotations: Vec::new(),
    }
}

/// Closed trades one hour apart starting at [`base_time`].
pub fn trades_from_pnls(pnls: &[f64]) -> Vec<Trade> {
    pnls.iter()
        .enumerate()
        .map(|(i, &p)| make_trade(&format!("t{i}"), p, base_time() + Duration::hours(i as i64)))
        .collect()
}

pub fn open_trade(id: &str, market: &str, notional: f64, leverage: Option<f64>) -> Trade {
    let mut t = make_trade(id, 0.0, base_time());
    t.market = market.to_string();
    t.entry_price = notional;
    t.exit_price = None;
    t.pnl = None;
    t.pnl_percent = None;
    t.leverage = leverage;
    t.status = TradeStatus::Open;
    t.duration = None;
    t
}

pub const CSV_HEADER: &str = "id,tx_signature,timestamp,market,market_type,side,order_type,entry_price,exit_price,quantity,leverage,pnl,pnl_percent,trading_fee,funding_fee,status,duration,annotations";

pub fn write_temp_csv(rows: &[&str]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{CSV_HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
