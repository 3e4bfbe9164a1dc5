//! Synthetic trade history for demos and tests.
//!
//! The generated book is slightly profitable (about 55% winners) with a mix
//! of spot and perpetual markets, a few liquidations and some open positions.

use super::trade::{Fees, MarketType, OrderType, Side, Trade, TradeStatus};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

pub const MOCK_MARKETS: [&str; 6] = [
    "SOL-USDC",
    "BTC-USDC",
    "ETH-USDC",
    "BONK-USDC",
    "JTO-USDC",
    "WIF-USDC",
];

const SIGNATURE_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const SIGNATURE_LEN: usize = 88;
const ENTRY_SPREAD: f64 = 0.05;
const CLOSED_SHARE: f64 = 0.9;
const LIQUIDATED_SHARE: f64 = 0.05;
const WIN_SHARE: f64 = 0.55;
const MAX_MOVE: f64 = 0.08;
const OPEN_MOVE: f64 = 0.02;
const TRADING_FEE_RATE: f64 = 0.001;
const PRICE_DIGITS: i32 = 6;

/// Approximate quote price for a mock market; unknown markets trade at 100.
pub fn base_price(market: &str) -> f64 {
    match market {
        "SOL-USDC" => 180.0,
        "BTC-USDC" => 95_000.0,
        "ETH-USDC" => 3_200.0,
        "BONK-USDC" => 0.000025,
        "JTO-USDC" => 3.5,
        "WIF-USDC" => 2.8,
        _ => 100.0,
    }
}

/// `count` trades with timestamps uniform in `[start, end)`, oldest first.
pub fn generate_mock_trades<R: Rng>(
    count: usize,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Trade> {
    let span_ms = (end - start).num_milliseconds().max(0);

    let mut trades: Vec<Trade> = (0..count)
        .map(|i| {
            let offset = if span_ms > 0 {
                rng.gen_range(0..span_ms)
            } else {
                0
            };
            mock_trade(i, start + Duration::milliseconds(offset), rng)
        })
        .collect();

    trades.sort_by_key(|t| t.timestamp);
    trades
}

fn mock_trade<R: Rng>(i: usize, timestamp: DateTime<Utc>, rng: &mut R) -> Trade {
    let market = MOCK_MARKETS[rng.gen_range(0..MOCK_MARKETS.len())];
    let market_type = if rng.gen_bool(0.5) {
        MarketType::Spot
    } else {
        MarketType::Perpetual
    };
    let side = if rng.gen_bool(0.5) { Side::Long } else { Side::Short };
    let order_type = if rng.gen_bool(0.7) {
        OrderType::Market
    } else {
        OrderType::Limit
    };

    let entry_price = round_price(
        base_price(market) * (1.0 + rng.gen_range(-0.5_f64..0.5) * ENTRY_SPREAD),
    );

    let status = if rng.gen_bool(CLOSED_SHARE) {
        if rng.gen_bool(LIQUIDATED_SHARE) {
            TradeStatus::Liquidated
        } else {
            TradeStatus::Closed
        }
    } else {
        TradeStatus::Open
    };

    let quantity = round_to(rng.gen_range(0.1..10.1), 4);
    let leverage = match market_type {
        MarketType::Perpetual => Some(f64::from(rng.gen_range(1..=5u8))),
        _ => None,
    };
    let lev = leverage.unwrap_or(1.0);
    let direction = match side {
        Side::Long => 1.0,
        Side::Short => -1.0,
    };

    let (exit_price, pnl, duration) = if status == TradeStatus::Open {
        let mark = entry_price * (1.0 + rng.gen_range(-0.5_f64..0.5) * OPEN_MOVE);
        let unrealized = (mark - entry_price) * direction * quantity * lev;
        (None, round_to(unrealized, 2), None)
    } else {
        let sign = if rng.gen_bool(WIN_SHARE) { 1.0 } else { -1.0 };
        let change = rng.gen_range(0.0..MAX_MOVE) * sign;
        let exit = round_price(entry_price * (1.0 + change * direction));
        let realized = (exit - entry_price) * direction * quantity * lev;
        let held = rng.gen_range(60..172_860u64);
        (Some(exit), round_to(realized, 2), Some(held))
    };

    let notional = entry_price * quantity;
    let funding = match market_type {
        MarketType::Perpetual => round_to(rng.gen_range(0.0..0.5), 4),
        _ => 0.0,
    };

    Trade {
        id: format!("mock-{i:04}"),
        tx_signature: tx_signature(rng),
        timestamp,
        market: market.to_string(),
        market_type,
        side,
        order_type,
        entry_price,
        exit_price,
        quantity,
        leverage,
        pnl: Some(pnl),
        pnl_percent: Some(if notional > 0.0 {
            round_to(pnl / notional * 100.0, 2)
        } else {
            0.0
        }),
        fees: Fees {
            trading: round_to(notional * TRADING_FEE_RATE, 4),
            funding,
        },
        status,
        duration,
        annotations: Vec::new(),
    }
}

fn tx_signature<R: Rng>(rng: &mut R) -> String {
    (0..SIGNATURE_LEN)
        .map(|_| SIGNATURE_ALPHABET[rng.gen_range(0..SIGNATURE_ALPHABET.len())] as char)
        .collect()
}

/// Rounds to [`PRICE_DIGITS`] significant digits so sub-cent prices survive.
fn round_price(value: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    round_to(value, PRICE_DIGITS - 1 - magnitude)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (start, start + Duration::days(30))
    }

    #[test]
    fn generates_requested_count_in_order() {
        let (start, end) = window();
        let mut rng = StdRng::seed_from_u64(7);
        let trades = generate_mock_trades(200, start, end, &mut rng);

        assert_eq!(trades.len(), 200);
        assert!(trades.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        assert!(trades.iter().all(|t| t.timestamp >= start && t.timestamp < end));
    }

    #[test]
    fn same_seed_same_trades() {
        let (start, end) = window();
        let a = generate_mock_trades(50, start, end, &mut StdRng::seed_from_u64(42));
        let b = generate_mock_trades(50, start, end, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn records_respect_status_invariants() {
        let (start, end) = window();
        let trades = generate_mock_trades(300, start, end, &mut StdRng::seed_from_u64(1));

        for t in &trades {
            assert!(t.quantity >= 0.1 && t.quantity <= 10.1);
            assert!(t.entry_price > 0.0);
            assert!(t.pnl.is_some());
            assert_eq!(t.tx_signature.len(), SIGNATURE_LEN);
            match t.status {
                TradeStatus::Open => {
                    assert!(t.exit_price.is_none());
                    assert!(t.duration.is_none());
                }
                _ => {
                    assert!(t.exit_price.is_some());
                    let d = t.duration.unwrap();
                    assert!((60..172_860).contains(&d));
                }
            }
            match t.market_type {
                MarketType::Perpetual => {
                    let lev = t.leverage.unwrap();
                    assert!((1.0..=5.0).contains(&lev));
                }
                _ => {
                    assert!(t.leverage.is_none());
                    assert_eq!(t.fees.funding, 0.0);
                }
            }
        }
        assert!(trades.iter().any(|t| t.is_open()));
        assert!(trades.iter().any(|t| t.is_closed()));
    }

    #[test]
    fn empty_window_pins_timestamps_to_start() {
        let (start, _) = window();
        let trades = generate_mock_trades(3, start, start, &mut StdRng::seed_from_u64(3));
        assert!(trades.iter().all(|t| t.timestamp == start));
    }

    #[test]
    fn unknown_market_price() {
        assert_eq!(base_price("DOGE-USDC"), 100.0);
        assert_eq!(base_price("SOL-USDC"), 180.0);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(-0.125, 2), -0.13);
        assert_relative_eq!(round_price(0.0000251234567), 0.0000251235);
        assert_relative_eq!(round_price(95_123.456), 95_123.5);
        assert_eq!(round_price(0.0), 0.0);
    }

    #[test]
    fn sub_cent_market_keeps_price_and_consistent_costs() {
        let (start, end) = window();
        let trades = generate_mock_trades(400, start, end, &mut StdRng::seed_from_u64(5));
        let bonk: Vec<&Trade> = trades.iter().filter(|t| t.market == "BONK-USDC").collect();
        assert!(!bonk.is_empty());

        for t in bonk {
            assert!(t.entry_price > 0.0 && t.entry_price < 0.001);
            assert!(t.notional() > 0.0);
            assert_relative_eq!(
                t.fees.trading,
                round_to(t.notional() * TRADING_FEE_RATE, 4),
                epsilon = 1e-12
            );
            if let Some(exit) = t.exit_price {
                assert!(exit > 0.0);
            }
        }
    }
}
