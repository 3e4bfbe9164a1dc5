//! Trade source port trait.
//!
//! A trade source is either an imported history or a synthetic book; the
//! analytics layer only sees the resulting `Vec<Trade>`.

use crate::domain::error::JournalError;
use crate::domain::trade::Trade;

pub trait TradePort {
    /// All trades known to the source, oldest first.
    fn fetch_trades(&self) -> Result<Vec<Trade>, JournalError>;

    /// Short human-readable description used in log lines.
    fn describe(&self) -> String;
}
