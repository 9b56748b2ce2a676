//! API request and response models.
//!
//! Request bodies keep their fields optional so that missing or malformed values can be
//! reported per field instead of failing JSON extraction. Money is serialized as a decimal
//! string with two places and dates as `YYYY-MM-DD`.

pub mod auth;
pub mod budgets;
pub mod category;
pub mod expenses;
pub mod summaries;
pub mod users;
