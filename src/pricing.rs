// Trip pricing: billable days, total, and the fixed advance split

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::BookingConfig;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub days: i64,
    pub daily_rate: i64,
    pub total_amount: i64,
    pub advance_amount: i64,
    /// `total_amount - advance_amount`, never clamped. Negative when the
    /// trip costs less than the advance.
    pub remaining_amount: i64,
}

impl PriceBreakdown {
    pub fn requires_balance(&self) -> bool {
        self.remaining_amount > 0
    }
}

/// Billable days: elapsed time rounded up to whole days, at least one.
pub fn trip_days(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    let elapsed_ms = (end - start).num_milliseconds();
    // ceil for positive spans; zero and negative spans fall to the minimum
    let days = if elapsed_ms > 0 {
        (elapsed_ms + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    } else {
        0
    };
    days.max(1)
}

/// Amounts saturate at the `i64` bounds instead of overflowing.
pub fn compute_price(
    start: NaiveDateTime,
    end: NaiveDateTime,
    daily_rate: i64,
    advance_amount: i64,
) -> PriceBreakdown {
    let days = trip_days(start, end);
    let total_amount = days.saturating_mul(daily_rate);

    PriceBreakdown {
        days,
        daily_rate,
        total_amount,
        advance_amount,
        remaining_amount: total_amount.saturating_sub(advance_amount),
    }
}

/// Prices trips with the advance amount taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingCalculator {
    advance_amount: i64,
}

impl Default for PricingCalculator {
    fn default() -> Self {
        Self::from(&BookingConfig::default())
    }
}

impl From<&BookingConfig> for PricingCalculator {
    fn from(config: &BookingConfig) -> Self {
        Self {
            advance_amount: config.advance_amount,
        }
    }
}

impl PricingCalculator {
    pub fn new(advance_amount: i64) -> Self {
        Self { advance_amount }
    }

    pub fn advance_amount(&self) -> i64 {
        self.advance_amount
    }

    pub fn price(&self, start: NaiveDateTime, end: NaiveDateTime, daily_rate: i64) -> PriceBreakdown {
        compute_price(start, end, daily_rate, self.advance_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use test_case::test_case;

    fn at(m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test_case(at(5, 5, 0), at(5, 5, 0), 1; "same instant bills one day")]
    #[test_case(at(5, 5, 0), at(5, 5, 20), 1; "sub day span bills one day")]
    #[test_case(at(5, 5, 0), at(5, 6, 0), 1; "exactly one day")]
    #[test_case(at(5, 5, 22), at(5, 6, 23), 2; "partial second day rounds up")]
    #[test_case(at(5, 5, 0), at(5, 7, 0), 2; "midnight to midnight")]
    #[test_case(at(5, 7, 0), at(5, 5, 0), 1; "reversed span falls to minimum")]
    fn test_trip_days(start: NaiveDateTime, end: NaiveDateTime, expected: i64) {
        assert_eq!(trip_days(start, end), expected);
    }

    #[test]
    fn test_two_day_trip_breakdown() {
        let breakdown = compute_price(at(5, 5, 0), at(5, 7, 0), 15_000, 10_000);
        assert_eq!(
            breakdown,
            PriceBreakdown {
                days: 2,
                daily_rate: 15_000,
                total_amount: 30_000,
                advance_amount: 10_000,
                remaining_amount: 20_000,
            }
        );
        assert!(breakdown.requires_balance());
    }

    #[test]
    fn test_cheap_trip_goes_negative_without_clamping() {
        let breakdown = compute_price(at(5, 5, 0), at(5, 5, 12), 8_000, 10_000);
        assert_eq!(breakdown.total_amount, 8_000);
        assert_eq!(breakdown.remaining_amount, -2_000);
        assert!(!breakdown.requires_balance());
    }

    #[test]
    fn test_huge_daily_rate_saturates() {
        let breakdown = compute_price(at(5, 5, 0), at(5, 7, 0), i64::MAX / 2 + 1, 10_000);
        assert_eq!(breakdown.days, 2);
        assert_eq!(breakdown.total_amount, i64::MAX);
        assert_eq!(breakdown.remaining_amount, i64::MAX - 10_000);

        let breakdown = compute_price(at(5, 5, 0), at(5, 5, 0), 0, i64::MIN);
        assert_eq!(breakdown.remaining_amount, i64::MAX);
    }

    #[test]
    fn test_compute_price_is_deterministic() {
        let first = compute_price(at(6, 1, 9), at(6, 4, 18), 12_000, 10_000);
        let second = compute_price(at(6, 1, 9), at(6, 4, 18), 12_000, 10_000);
        assert_eq!(first, second);
        assert_eq!(first.days, 4);
    }

    #[test]
    fn test_calculator_uses_configured_advance() {
        let config = BookingConfig {
            advance_amount: 5_000,
            ..BookingConfig::default()
        };
        let calculator = PricingCalculator::from(&config);
        let breakdown = calculator.price(at(5, 5, 0), at(5, 5, 0), 25_000);
        assert_eq!(breakdown.advance_amount, 5_000);
        assert_eq!(breakdown.remaining_amount, 20_000);
        assert_eq!(PricingCalculator::default().advance_amount(), 10_000);
    }
}
