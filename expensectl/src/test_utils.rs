//! Test utilities shared by the unit and HTTP tests.

use crate::auth::password::{self, Argon2Params};
use crate::config::{Config, PasswordConfig, PoolSettings};
use crate::db::{
    handlers::{AuthTokens, Users},
    models::users::{UserCreateDBRequest, UserDBResponse},
};
use axum::http::HeaderValue;
use axum_test::TestServer;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

/// Cheap Argon2 parameters so hashing does not dominate test time.
pub fn fast_argon2() -> Argon2Params {
    Argon2Params {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn create_test_config() -> Config {
    let argon2 = fast_argon2();
    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..Default::default()
    };
    config.database.pool = PoolSettings {
        max_connections: 2,
        min_connections: 0,
        ..Default::default()
    };
    config.auth.password = PasswordConfig {
        argon2_memory_kib: argon2.memory_kib,
        argon2_iterations: argon2.iterations,
        argon2_parallelism: argon2.parallelism,
        ..Default::default()
    };
    config
}

/// Full application (real router, auth gate, middleware) over the given test database.
pub async fn create_test_app(pool: PgPool) -> TestServer {
    let app = crate::Application::new_with_pool(create_test_config(), Some(pool))
        .await
        .expect("Failed to create application");
    app.into_test_server()
}

pub async fn create_test_user(pool: &PgPool, username: &str) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let password_hash = password::hash_password("password123", fast_argon2()).expect("Failed to hash password");
    Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash,
        })
        .await
        .expect("Failed to create test user")
}

/// A user plus the `Authorization` header value that authenticates as them.
pub async fn create_authenticated_user(pool: &PgPool, username: &str) -> (UserDBResponse, HeaderValue) {
    let user = create_test_user(pool, username).await;
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let token = AuthTokens::new(&mut conn)
        .get_or_create(user.id)
        .await
        .expect("Failed to issue token");
    (user, token_header(&token.key))
}

pub fn token_header(key: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Token {key}")).expect("token is a valid header value")
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid YYYY-MM-DD date")
}

pub fn money(s: &str) -> Decimal {
    s.parse().expect("valid decimal")
}
