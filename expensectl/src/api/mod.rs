//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for every `/api` endpoint
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/api/register/`, `/api/login/`, `/api/secure/`)
//! - **Expenses** (`/api/expenses/add/`, `/api/expenses/{id}/`, ...)
//! - **Summaries** (`/api/expenses/*-summary/`, `/api/expenses/search/`, ...)
//! - **Budgets** (`/api/budget/*`, `/api/expenses/budget/total/`)
//!
//! Everything except register and login requires `Authorization: Token <key>`. Routes are
//! declared with a trailing slash and documented with `utoipa`; the rendered docs live at
//! `/docs`.

pub mod handlers;
pub mod models;
