//! Authentication.
//!
//! Every endpoint under `/api` requires an opaque per-user token except registration and
//! login, which issue it. Clients present the token as:
//!
//! ```text
//! Authorization: Token <key>
//! ```
//!
//! `Bearer <key>` is accepted as an alias.
//!
//! # Modules
//!
//! - [`middleware`]: The gate that rejects unauthenticated `/api` requests with 401
//! - [`current_user`]: Extractor for getting the authenticated user in handlers
//! - [`password`]: Password hashing and verification using Argon2

pub mod current_user;
pub mod middleware;
pub mod password;
