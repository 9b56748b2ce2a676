use crate::{
    AppState,
    api::models::users::CurrentUser,
    db::handlers::AuthTokens,
    errors::{Error, Result},
};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use sqlx::PgPool;
use tracing::{instrument, trace};

/// Pull the key out of an `Authorization: Token <key>` (or `Bearer <key>`) header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, key) = value.trim().split_once(' ')?;
    if !(scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer")) {
        return None;
    }
    let key = key.trim();
    (!key.is_empty() && !key.contains(' ')).then_some(key)
}

/// Resolve the request's token to a user. `None` covers a missing header, a malformed
/// header and an unknown key alike.
#[instrument(skip_all)]
pub async fn authenticate(db: &PgPool, headers: &HeaderMap) -> Result<Option<CurrentUser>> {
    let Some(key) = token_from_headers(headers) else {
        trace!("No usable Authorization header");
        return Ok(None);
    };

    let mut conn = db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = AuthTokens::new(&mut conn).authenticate(key).await?;
    Ok(user.map(CurrentUser::from))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        // Normally the gate has already resolved the caller
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        authenticate(&state.db, &parts.headers)
            .await?
            .ok_or(Error::Unauthenticated { message: None })
    }
}
