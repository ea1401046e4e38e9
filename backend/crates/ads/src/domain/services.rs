//! Domain Services
//!
//! Pure pricing and calendar logic for ad slots.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Percentage off for bookings of at least `min_days`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountTier {
    pub min_days: u32,
    pub percent: u8,
}

/// Price breakdown in minor currency units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub price_per_day: i64,
    pub days: u32,
    pub subtotal: i64,
    pub discount_percent: u8,
    pub discount: i64,
    pub amount: i64,
}

/// Best tier the duration qualifies for
pub fn discount_percent(days: u32, tiers: &[DiscountTier]) -> u8 {
    tiers
        .iter()
        .filter(|t| days >= t.min_days)
        .map(|t| t.percent)
        .max()
        .unwrap_or(0)
}

/// Integer pricing; the discount rounds down so the advertiser never pays
/// less than the listed tier implies.
pub fn quote(price_per_day: i64, days: u32, tiers: &[DiscountTier]) -> Quote {
    let subtotal = price_per_day.saturating_mul(days as i64);
    let percent = discount_percent(days, tiers);
    let discount = subtotal.saturating_mul(percent as i64) / 100;
    Quote {
        price_per_day,
        days,
        subtotal,
        discount_percent: percent,
        discount,
        amount: subtotal - discount,
    }
}

/// Inclusive ranges `a` and `b` share at least one day
pub fn ranges_overlap(a: (NaiveDate, NaiveDate), b: (NaiveDate, NaiveDate)) -> bool {
    a.0 <= b.1 && b.0 <= a.1
}

/// First date on or after `today` covered by none of `taken`
/// (inclusive ranges, any order).
pub fn next_free_date(today: NaiveDate, taken: &[(NaiveDate, NaiveDate)]) -> NaiveDate {
    let mut ranges = taken.to_vec();
    ranges.sort_by_key(|r| r.0);

    let mut candidate = today;
    for (start, end) in ranges {
        if start > candidate {
            break;
        }
        if end >= candidate {
            candidate = end + Duration::days(1);
        }
    }
    candidate
}
