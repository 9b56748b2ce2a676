//! Input parsing shared by the request handlers.
//!
//! Query-string inputs fail with a single `{"error": ...}` message; JSON body fields are
//! collected into a per-field map by the request models.

use crate::api::models::category::Category;
use crate::errors::{Error, FieldErrors, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub const DATE_FORMAT_ERROR: &str = "Invalid date format, use YYYY-MM-DD";
pub const REQUIRED_FIELD: &str = "This field is required.";
pub const NULL_CHARACTERS: &str = "Null characters are not allowed.";

/// Precision of stored money columns, NUMERIC(10, 2).
const MAX_DIGITS: u32 = 10;
const DECIMAL_PLACES: u32 = 2;

/// Parse a strict `YYYY-MM-DD` date. Surrounding whitespace is ignored.
pub fn parse_date(raw: &str) -> std::result::Result<NaiveDate, &'static str> {
    let raw = raw.trim();
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| if i == 4 || i == 7 { *b == b'-' } else { b.is_ascii_digit() });
    if !shaped {
        return Err(DATE_FORMAT_ERROR);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| DATE_FORMAT_ERROR)
}

/// A required date query parameter.
pub fn required_date(raw: Option<&str>) -> Result<NaiveDate> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Err(Error::bad_request("Date parameter is required")),
        Some(s) => parse_date(s).map_err(Error::bad_request),
    }
}

/// A required category query or path parameter.
pub fn required_category(raw: Option<&str>) -> Result<Category> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Err(Error::bad_request("Category parameter is required")),
        Some(s) => s.parse().map_err(|e: crate::api::models::category::InvalidCategory| Error::bad_request(e.to_string())),
    }
}

/// Parse a money amount from a JSON number or numeric string.
///
/// Rejects negative values and anything that does not fit NUMERIC(10, 2). The result is
/// rescaled to exactly two decimal places.
pub fn parse_amount(value: &serde_json::Value) -> std::result::Result<Decimal, String> {
    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().to_string(),
        _ => return Err("A valid number is required.".to_string()),
    };

    let parsed: Decimal = text
        .parse()
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| "A valid number is required.".to_string())?;

    let normalized = parsed.normalize();
    let decimal_places = normalized.scale();
    let whole = normalized.trunc().abs();
    let whole_digits = if whole.is_zero() { 0 } else { whole.to_string().len() as u32 };

    if whole_digits + decimal_places > MAX_DIGITS {
        return Err(format!("Ensure that there are no more than {MAX_DIGITS} digits in total."));
    }
    if decimal_places > DECIMAL_PLACES {
        return Err(format!("Ensure that there are no more than {DECIMAL_PLACES} decimal places."));
    }
    if whole_digits > MAX_DIGITS - DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {} digits before the decimal point.",
            MAX_DIGITS - DECIMAL_PLACES
        ));
    }
    if normalized.is_sign_negative() && !normalized.is_zero() {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }

    let mut amount = normalized.abs();
    amount.rescale(DECIMAL_PLACES);
    Ok(amount)
}

/// Collects per-field messages while validating a request body.
#[derive(Debug, Default)]
pub struct FieldValidator {
    errors: FieldErrors,
}

impl FieldValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_default().push(message.into());
    }

    /// Record the error of a field result, returning its value on success.
    pub fn check<T, E: ToString>(&mut self, field: &str, result: std::result::Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.add(field, e.to_string());
                None
            }
        }
    }

    /// Record "required" for a missing value.
    pub fn require<'a, T>(&mut self, field: &str, value: Option<&'a T>) -> Option<&'a T> {
        if value.is_none() {
            self.add(field, REQUIRED_FIELD);
        }
        value
    }

    /// Postgres TEXT cannot hold NUL, so it is a field error rather than a failed insert.
    pub fn text(&mut self, field: &str, value: Option<&str>) {
        if value.is_some_and(|text| text.contains('\0')) {
            self.add(field, NULL_CHARACTERS);
        }
    }

    pub fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation { errors: self.errors })
        }
    }
}
