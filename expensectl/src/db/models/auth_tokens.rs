use crate::types::UserId;
use chrono::{DateTime, Utc};

/// A user's API token.
#[derive(Debug, Clone)]
pub struct AuthTokenDBResponse {
    pub key: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}
