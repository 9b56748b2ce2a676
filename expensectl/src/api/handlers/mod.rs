//! HTTP request handlers for all API endpoints.
//!
//! Each handler validates its input, runs owner-scoped repository calls against a pooled
//! connection and serializes the response. Failures are returned as
//! [`crate::errors::Error`], which renders the JSON error body.
//!
//! - [`auth`]: Registration, login and the token smoke test
//! - [`expenses`]: Expense creation, listing, deletion and description updates
//! - [`summaries`]: Aggregate views over a user's expenses
//! - [`budgets`]: Monthly per-category budgets
//!
//! The caller is available through the [`crate::api::models::users::CurrentUser`]
//! extractor, which the token gate in [`crate::auth::middleware`] has already resolved.

pub mod auth;
pub mod budgets;
pub mod expenses;
pub mod summaries;
