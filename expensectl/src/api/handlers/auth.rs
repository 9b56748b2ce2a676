use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};

use crate::{
    AppState,
    api::models::{
        auth::{LoginRequest, MessageResponse, RegisterRequest, TokenResponse},
        users::CurrentUser,
    },
    auth::password,
    db::{
        handlers::{AuthTokens, Users},
        models::users::UserCreateDBRequest,
    },
    errors::{Error, Result},
};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Register a new user account
#[utoipa::path(
    post,
    path = "/api/register/",
    request_body = RegisterRequest,
    tag = "authentication",
    responses(
        (status = 201, description = "User registered successfully", body = TokenResponse),
        (status = 400, description = "Invalid input or username already taken"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TokenResponse>)> {
    let Json(request) = payload?;
    let registration = request.validate()?;

    let password_config = &state.config.auth.password;
    password::check_length(&registration.password, password_config.min_length, password_config.max_length)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let mut user_repo = Users::new(&mut tx);
    if user_repo.get_by_username(&registration.username).await?.is_some() {
        return Err(Error::Conflict {
            message: "Username already taken".to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid blocking async runtime
    let params = password_config.argon2_params();
    let plain = registration.password;
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plain, params))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    // A concurrent registration can still win the race; the unique constraint maps to the same message
    let user = user_repo
        .create(&UserCreateDBRequest {
            username: registration.username,
            email: registration.email,
            password_hash,
        })
        .await?;

    let token = AuthTokens::new(&mut tx).get_or_create(user.id).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    tracing::info!("Registered user {}", user.username);

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            message: "User registered successfully".to_string(),
            token: token.key,
        }),
    ))
}

/// Exchange a username and password for the user's API token
#[utoipa::path(
    post,
    path = "/api/login/",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Missing fields or invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>> {
    let Json(request) = payload?;
    let (username, plain) = request.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let user = Users::new(&mut conn)
        .get_by_username(&username)
        .await?
        .ok_or_else(|| Error::bad_request(INVALID_CREDENTIALS))?;

    let password_hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&plain, &password_hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::bad_request(INVALID_CREDENTIALS));
    }

    let token = AuthTokens::new(&mut conn).get_or_create(user.id).await?;

    Ok(Json(TokenResponse {
        message: "Login successful".to_string(),
        token: token.key,
    }))
}

/// Check that the supplied token is accepted
#[utoipa::path(
    get,
    path = "/api/secure/",
    tag = "authentication",
    responses(
        (status = 200, description = "Token accepted", body = MessageResponse),
        (status = 401, description = "Missing or unknown token"),
    ),
    security(("token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn secure(_user: CurrentUser) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello, authenticated user!".to_string(),
    })
}
