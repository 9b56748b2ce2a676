//! Database record models matching table schemas.
//!
//! Database models are distinct from API models so storage and wire representations can
//! evolve independently. Conversions into API responses live next to the API models.
//!
//! - [`users`]: User accounts
//! - [`auth_tokens`]: Opaque per-user API tokens
//! - [`expenses`]: Expense records and aggregates
//! - [`budgets`]: Monthly per-category budgets

pub mod auth_tokens;
pub mod budgets;
pub mod expenses;
pub mod users;
