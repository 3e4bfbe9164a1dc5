//! Synthetic trade source for demos.

use crate::domain::error::JournalError;
use crate::domain::mock::generate_mock_trades;
use crate::domain::settings::{DEFAULT_MOCK_COUNT, DEFAULT_MOCK_DAYS};
use crate::domain::trade::Trade;
use crate::ports::trade_port::TradePort;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub struct MockTradeAdapter {
    count: usize,
    seed: Option<u64>,
    days: u32,
    end: Option<DateTime<Utc>>,
}

impl Default for MockTradeAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_MOCK_COUNT, None, DEFAULT_MOCK_DAYS)
    }
}

impl MockTradeAdapter {
    pub fn new(count: usize, seed: Option<u64>, days: u32) -> Self {
        Self {
            count,
            seed,
            days,
            end: None,
        }
    }

    /// Pins the end of the generation window; otherwise it is "now".
    pub fn ending_at(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }
}

impl TradePort for MockTradeAdapter {
    fn fetch_trades(&self) -> Result<Vec<Trade>, JournalError> {
        let end = self.end.unwrap_or_else(Utc::now);
        let start = end - Duration::days(i64::from(self.days));
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(generate_mock_trades(self.count, start, end, &mut rng))
    }

    fn describe(&self) -> String {
        match self.seed {
            Some(seed) => format!(
                "{} mock trades over {} days (seed {seed})",
                self.count, self.days
            ),
            None => format!("{} mock trades over {} days", self.count, self.days),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn default_generates_hundred_trades_in_window() {
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let trades = MockTradeAdapter::default()
            .ending_at(end)
            .fetch_trades()
            .unwrap();
        assert_eq!(trades.len(), 100);
        let start = end - Duration::days(30);
        assert!(trades.iter().all(|t| t.timestamp >= start && t.timestamp < end));
    }

    #[test]
    fn seeded_output_is_reproducible() {
        let end = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let a = MockTradeAdapter::new(20, Some(5), 7).ending_at(end);
        let b = MockTradeAdapter::new(20, Some(5), 7).ending_at(end);
        assert_eq!(a.fetch_trades().unwrap(), b.fetch_trades().unwrap());
        assert_eq!(a.describe(), "20 mock trades over 7 days (seed 5)");
    }

    #[test]
    fn zero_count_is_empty() {
        let trades = MockTradeAdapter::new(0, None, 30).fetch_trades().unwrap();
        assert!(trades.is_empty());
    }
}
