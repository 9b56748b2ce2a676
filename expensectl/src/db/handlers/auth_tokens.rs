//! Database repository for API tokens.
//!
//! Each user has at most one token. It is created the first time the user registers or
//! logs in and handed back unchanged on every later login.

use super::users::User;
use crate::crypto::generate_token;
use crate::db::{
    errors::Result,
    models::{auth_tokens::AuthTokenDBResponse, users::UserDBResponse},
};
use crate::types::{UserId, abbrev_uuid};
use chrono::{DateTime, Utc};
use sqlx::{Connection, FromRow, PgConnection};
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct AuthToken {
    key: String,
    user_id: UserId,
    created_at: DateTime<Utc>,
}

impl From<AuthToken> for AuthTokenDBResponse {
    fn from(token: AuthToken) -> Self {
        Self {
            key: token.key,
            user_id: token.user_id,
            created_at: token.created_at,
        }
    }
}

pub struct AuthTokens<'c> {
    db: &'c mut PgConnection,
}

impl<'c> AuthTokens<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Return the user's token, issuing one if they have none yet.
    ///
    /// Concurrent callers for the same user all end up with the same key.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn get_or_create(&mut self, user_id: UserId) -> Result<AuthTokenDBResponse> {
        let mut tx = self.db.begin().await?;

        sqlx::query("INSERT INTO auth_tokens (key, user_id) VALUES ($1, $2) ON CONFLICT (user_id) DO NOTHING")
            .bind(generate_token())
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let token = sqlx::query_as::<_, AuthToken>("SELECT key, user_id, created_at FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(token.into())
    }

    /// Resolve a presented key to its owner.
    #[instrument(skip_all, err)]
    pub async fn authenticate(&mut self, key: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.created_at
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(user.map(Into::into))
    }
}
