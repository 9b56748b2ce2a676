use crate::{AppState, auth::current_user::authenticate, errors::Error};
use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use tracing::{debug, trace};

/// Paths under `/api` that are reachable without a token.
const PUBLIC_PATHS: &[&str] = &["/api/register", "/api/login"];

fn requires_token(path: &str) -> bool {
    let gated = path == "/api" || path.starts_with("/api/");
    gated && !PUBLIC_PATHS.contains(&path.trim_end_matches('/'))
}

/// Token gate for the `/api` surface.
///
/// Runs before routing, so unknown `/api` paths are rejected with 401 as well. On success
/// the resolved [`crate::api::models::users::CurrentUser`] is stored in the request
/// extensions for the handler's extractor. CORS preflights never carry credentials and
/// are passed through to the CORS layer.
pub async fn require_token(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response, Error> {
    let path = request.uri().path();
    if request.method() == Method::OPTIONS || !requires_token(path) {
        return Ok(next.run(request).await);
    }

    let Some(user) = authenticate(&state.db, request.headers()).await? else {
        debug!("Rejected unauthenticated request to {}", path);
        return Err(Error::Unauthenticated { message: None });
    };

    trace!("Authenticated user: {}", user.username);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::CurrentUser;
    use crate::test_utils::{create_authenticated_user, create_test_config, token_header};
    use axum::{Router, http::StatusCode, middleware::from_fn_with_state, routing::get};
    use axum_test::TestServer;
    use serde_json::json;
    use sqlx::PgPool;

    #[test]
    fn test_requires_token() {
        assert!(requires_token("/api/secure/"));
        assert!(requires_token("/api/expenses/add/"));
        assert!(requires_token("/api/does-not-exist"));
        assert!(!requires_token("/api/register/"));
        assert!(!requires_token("/api/login"));
        assert!(!requires_token("/docs"));
        assert!(!requires_token("/apixyz"));
    }

    async fn whoami(user: CurrentUser) -> String {
        user.username
    }

    fn gated_app(state: AppState) -> Router {
        Router::new()
            .route("/api/whoami/", get(whoami))
            .route("/api/login/", get(|| async { "open" }))
            .layer(from_fn_with_state(state.clone(), require_token))
            .with_state(state)
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_gate_rejects_missing_and_bad_tokens(pool: PgPool) {
        let state = AppState::builder().db(pool).config(create_test_config()).build();
        let server = TestServer::new(gated_app(state)).unwrap();

        let response = server.get("/api/whoami/").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({ "detail": "Authentication required" }));

        let response = server
            .get("/api/whoami/")
            .add_header(axum::http::header::AUTHORIZATION, token_header("bogus"))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_gate_passes_valid_token_and_public_paths(pool: PgPool) {
        let (_user, header) = create_authenticated_user(&pool, "alice").await;
        let state = AppState::builder().db(pool).config(create_test_config()).build();
        let server = TestServer::new(gated_app(state)).unwrap();

        let response = server.get("/api/whoami/").add_header(axum::http::header::AUTHORIZATION, header).await;
        response.assert_status_ok();
        response.assert_text("alice");

        server.get("/api/login/").await.assert_text("open");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_gate_lets_preflight_through(pool: PgPool) {
        let state = AppState::builder().db(pool).config(create_test_config()).build();
        let server = TestServer::new(gated_app(state)).unwrap();

        let response = server.method(axum::http::Method::OPTIONS, "/api/whoami/").await;
        assert_ne!(response.status_code(), StatusCode::UNAUTHORIZED);
    }
}
