//! R-multiple distribution: each closed trade's PnL expressed in units of the
//! average losing trade.

use super::trade::Trade;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RBucket {
    #[serde(rename = "<-3R")]
    BelowMinus3,
    #[serde(rename = "-3R to -2R")]
    Minus3ToMinus2,
    #[serde(rename = "-2R to -1R")]
    Minus2ToMinus1,
    #[serde(rename = "-1R to 0R")]
    Minus1ToZero,
    #[serde(rename = "0R to 1R")]
    ZeroTo1,
    #[serde(rename = "1R to 2R")]
    OneTo2,
    #[serde(rename = ">2R")]
    Above2,
}

impl RBucket {
    pub const ALL: [RBucket; 7] = [
        RBucket::BelowMinus3,
        RBucket::Minus3ToMinus2,
        RBucket::Minus2ToMinus1,
        RBucket::Minus1ToZero,
        RBucket::ZeroTo1,
        RBucket::OneTo2,
        RBucket::Above2,
    ];

    pub fn classify(r: f64) -> Self {
        if r < -3.0 {
            RBucket::BelowMinus3
        } else if r < -2.0 {
            RBucket::Minus3ToMinus2
        } else if r < -1.0 {
            RBucket::Minus2ToMinus1
        } else if r < 0.0 {
            RBucket::Minus1ToZero
        } else if r < 1.0 {
            RBucket::ZeroTo1
        } else if r < 2.0 {
            RBucket::OneTo2
        } else {
            RBucket::Above2
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RBucket::BelowMinus3 => "<-3R",
            RBucket::Minus3ToMinus2 => "-3R to -2R",
            RBucket::Minus2ToMinus1 => "-2R to -1R",
            RBucket::Minus1ToZero => "-1R to 0R",
            RBucket::ZeroTo1 => "0R to 1R",
            RBucket::OneTo2 => "1R to 2R",
            RBucket::Above2 => ">2R",
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, RBucket::ZeroTo1 | RBucket::OneTo2 | RBucket::Above2)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for RBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RBucketCount {
    pub bucket: RBucket,
    pub count: usize,
    pub is_positive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RDistribution {
    /// Non-empty buckets, most negative first.
    pub buckets: Vec<RBucketCount>,
    /// Mean R across all sampled trades; the expectancy in R.
    pub average_r: f64,
    /// The 1R unit.
    pub avg_loss_abs: f64,
    pub sample_size: usize,
}

/// `None` when there are no closed trades with a known PnL, or none of them
/// lost money (1R is undefined).
pub fn compute_r_distribution(trades: &[Trade]) -> Option<RDistribution> {
    let sample: Vec<f64> = trades
        .iter()
        .filter(|t| t.is_closed())
        .filter_map(|t| t.pnl)
        .collect();

    let avg_loss_abs = average_loss_abs(&sample);
    if sample.is_empty() || avg_loss_abs == 0.0 {
        return None;
    }

    let mut counts = [0usize; 7];
    let mut total_r = 0.0;
    for pnl in &sample {
        let r = pnl / avg_loss_abs;
        total_r += r;
        counts[RBucket::classify(r).index()] += 1;
    }

    let buckets = RBucket::ALL
        .iter()
        .filter(|b| counts[b.index()] > 0)
        .map(|&bucket| RBucketCount {
            bucket,
            count: counts[bucket.index()],
            is_positive: bucket.is_positive(),
        })
        .collect();

    Some(RDistribution {
        buckets,
        average_r: total_r / sample.len() as f64,
        avg_loss_abs,
        sample_size: sample.len(),
    })
}

/// Average R per closed trade, or 0 when 1R is undefined.
pub fn expectancy_r(trades: &[Trade]) -> f64 {
    compute_r_distribution(trades)
        .map(|d| d.average_r)
        .unwrap_or(0.0)
}

fn average_loss_abs(pnls: &[f64]) -> f64 {
    let losses: Vec<f64> = pnls.iter().copied().filter(|&p| p < 0.0).collect();
    if losses.is_empty() {
        return 0.0;
    }
    losses.iter().sum::<f64>().abs() / losses.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::test_support::{closed_trade, with_status};
    use crate::domain::trade::TradeStatus;
    use approx::assert_relative_eq;

    #[test]
    fn classify_boundaries_are_lower_inclusive() {
        assert_eq!(RBucket::classify(-3.5), RBucket::BelowMinus3);
        assert_eq!(RBucket::classify(-3.0), RBucket::Minus3ToMinus2);
        assert_eq!(RBucket::classify(-1.0), RBucket::Minus1ToZero);
        assert_eq!(RBucket::classify(0.0), RBucket::ZeroTo1);
        assert_eq!(RBucket::classify(1.0), RBucket::OneTo2);
        assert_eq!(RBucket::classify(2.0), RBucket::Above2);
    }

    #[test]
    fn no_losers_means_no_distribution() {
        let trades = vec![closed_trade("a", 10.0, 0), closed_trade("b", 0.0, 1)];
        assert!(compute_r_distribution(&trades).is_none());
        assert!(compute_r_distribution(&[]).is_none());
        assert_eq!(expectancy_r(&trades), 0.0);
    }

    #[test]
    fn buckets_and_average_r() {
        // Losers -50 and -150 average 100, so 1R = 100.
        let trades = vec![
            closed_trade("a", -50.0, 0),
            closed_trade("b", -150.0, 1),
            closed_trade("c", 250.0, 2),
            closed_trade("d", 50.0, 3),
        ];
        let dist = compute_r_distribution(&trades).unwrap();

        assert_eq!(dist.avg_loss_abs, 100.0);
        assert_eq!(dist.sample_size, 4);
        assert_relative_eq!(dist.average_r, (-0.5 - 1.5 + 2.5 + 0.5) / 4.0);

        let labels: Vec<(&str, usize)> = dist
            .buckets
            .iter()
            .map(|b| (b.bucket.label(), b.count))
            .collect();
        assert_eq!(
            labels,
            vec![("-2R to -1R", 1), ("-1R to 0R", 1), ("0R to 1R", 1), (">2R", 1)]
        );
        assert!(!dist.buckets[0].is_positive);
        assert!(dist.buckets[3].is_positive);
    }

    #[test]
    fn sample_excludes_open_and_unknown_pnl() {
        let mut unknown = closed_trade("u", 0.0, 2);
        unknown.pnl = None;
        let trades = vec![
            closed_trade("a", -10.0, 0),
            with_status(closed_trade("o", -1000.0, 1), TradeStatus::Open),
            unknown,
        ];
        let dist = compute_r_distribution(&trades).unwrap();
        assert_eq!(dist.sample_size, 1);
        assert_eq!(dist.avg_loss_abs, 10.0);
        assert_eq!(dist.average_r, -1.0);
    }

    #[test]
    fn bucket_order_matches_all() {
        for (i, b) in RBucket::ALL.iter().enumerate() {
            assert_eq!(b.index(), i);
        }
    }
}
