//! Repository implementations for database access.
//!
//! Each repository wraps a `&mut PgConnection` (a pooled connection or an open transaction)
//! and returns models from [`crate::db::models`].
//!
//! # Available Repositories
//!
//! - [`Users`]: Account creation and lookup
//! - [`AuthTokens`]: Token issue and resolution
//! - [`Expenses`]: Owner-scoped expense CRUD and aggregates (implements [`Repository`])
//! - [`Budgets`]: Owner-scoped monthly budgets

pub mod auth_tokens;
pub mod budgets;
pub mod expenses;
pub mod repository;
pub mod users;

pub use auth_tokens::AuthTokens;
pub use budgets::Budgets;
pub use expenses::Expenses;
pub use repository::Repository;
pub use users::Users;
