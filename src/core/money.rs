//! Money helpers - conversions between two-digit decimals and stored cents.
//!
//! Amounts never pass through floating point. Callers hand in `Decimal` values,
//! the store keeps whole cents, and every read converts back with scale 2.

use crate::errors::{Error, Result};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

/// Number of fractional digits carried by every monetary value.
pub const SCALE: u32 = 2;

/// Rounds an amount to whole cents (half away from zero).
#[must_use]
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts an amount to stored cents.
pub fn to_cents(amount: Decimal) -> Result<i64> {
    round_to_cents(amount)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
        .ok_or(Error::InvalidAmount { amount })
}

/// Converts stored cents back to a two-digit decimal.
#[must_use]
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, SCALE)
}

/// Validates a payment amount and converts it to cents. Zero and negative
/// amounts are rejected, as are amounts that round to zero cents.
pub fn positive_cents(amount: Decimal) -> Result<i64> {
    let cents = to_cents(amount)?;
    if cents <= 0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(cents)
}

/// Validates a price (zero allowed) and converts it to cents.
pub fn non_negative_cents(amount: Decimal) -> Result<i64> {
    let cents = to_cents(amount)?;
    if cents < 0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(cents)
}
