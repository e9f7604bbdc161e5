//! Billing calculator - how much an enrollment owes to date.
//!
//! Billing is calendar-month granular: the day of month is ignored and the
//! current month always counts as a full month. The course price is applied
//! to every elapsed month at its *current* value, so a price change re-prices
//! all months that are still unpaid.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;

/// Number of billable calendar months between `enrolled_at` and `now`,
/// including the current month. Never less than one.
#[must_use]
pub fn months_billable(enrolled_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let years = i64::from(now.year()) - i64::from(enrolled_at.year());
    let months = i64::from(now.month()) - i64::from(enrolled_at.month());
    (years * 12 + months + 1).max(1)
}

/// Total amount owed from enrollment start up to and including the month of `now`.
#[must_use]
pub fn amount_owed_to_date(
    enrolled_at: DateTime<Utc>,
    monthly_price: Decimal,
    now: DateTime<Utc>,
) -> Decimal {
    Decimal::from(months_billable(enrolled_at, now)) * monthly_price
}
