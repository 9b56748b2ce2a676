//! Common type definitions and calendar helpers.
//!
//! # ID Types
//!
//! - [`UserId`]: User account identifier (UUID)
//! - [`ExpenseId`]: Expense row identifier (BIGSERIAL)
//! - [`BudgetId`]: Budget row identifier (BIGSERIAL)
//!
//! # Utility Functions
//!
//! - [`abbrev_uuid`]: Abbreviate UUIDs to first 8 chars for logging
//! - [`today`]: The current UTC calendar date
//! - [`month_bounds`]: First and last day of a date's month
//! - [`money`]: Normalise a decoded amount to two decimal places

use chrono::{Datelike, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::ops::RangeInclusive;
use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type ExpenseId = i64;
pub type BudgetId = i64;

/// Years accepted in date filters. Postgres DATE goes further back, but BC years
/// and five-digit years are never meaningful here.
pub const YEAR_RANGE: RangeInclusive<i32> = 1..=9999;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// Today's date in UTC. All "current month" and default-date logic goes through here.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Inclusive first and last day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first);
    (first, last)
}

/// Inclusive first and last day of a calendar year, or `None` outside [`YEAR_RANGE`].
pub fn year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    if !YEAR_RANGE.contains(&year) {
        return None;
    }
    Some((NaiveDate::from_ymd_opt(year, 1, 1)?, NaiveDate::from_ymd_opt(year, 12, 31)?))
}

/// Money with exactly two decimal places.
///
/// Postgres drops the scale of a zero NUMERIC on the wire, so `0.00` decodes as `0`.
pub fn money(amount: Decimal) -> Decimal {
    let mut amount = amount;
    amount.rescale(2);
    amount
}
