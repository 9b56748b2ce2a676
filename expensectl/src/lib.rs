//! # expensectl: personal expense and budget tracking API
//!
//! `expensectl` is an HTTP/JSON service where authenticated users record expenses tagged
//! with a fixed set of categories, set one budget per category per calendar month, and query
//! aggregated views of their spending (daily, monthly, yearly, by category, by date range).
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer and
//! uses PostgreSQL (through `sqlx`) for all persistence.
//!
//! ### Request Flow
//!
//! Every request first passes through the token gate ([`auth::middleware::require_token`]),
//! which is applied around the whole router so that it runs before path matching. Requests
//! under `/api` other than register and login must carry `Authorization: Token <key>`; the
//! gate resolves the key to a user and stores it in the request extensions. The handler
//! then validates its input, calls owner-scoped repositories ([`db::handlers`]) and returns
//! JSON, or an [`errors::Error`] that renders the matching error body.
//!
//! ### Core Components
//!
//! - **API layer** ([`api`]): handlers and request/response models for `/api/...`
//! - **Authentication** ([`auth`]): password hashing, token extraction and the gate
//! - **Database layer** ([`db`]): repositories over `users`, `auth_tokens`, `expenses` and
//!   `budgets`; every expense and budget query is scoped to one owner
//! - **Configuration** ([`config`]) and **telemetry** ([`telemetry`])
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use expensectl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = expensectl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     expensectl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! Migrations are embedded and run automatically on startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//! expensectl::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
mod crypto;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod test_utils;

use crate::{config::CorsOrigin, errors::Error, openapi::ApiDoc};
use auth::middleware::require_token;
use axum::{
    Router, ServiceExt,
    http::{self, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use bon::Builder;
pub use config::Config;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{BudgetId, ExpenseId, UserId};

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder().db(pool).config(config).build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the expensectl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Connect the main pool with the configured limits and run migrations.
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let settings = &config.database.pool;
    info!("Connecting to database (max {} connections)", settings.max_connections);

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(Some(Duration::from_secs(settings.idle_timeout_secs)))
        .max_lifetime(Some(Duration::from_secs(settings.max_lifetime_secs)))
        .connect(&config.database.url)
        .await?;

    migrator().run(&pool).await?;
    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.cors;

    let allow_origin = if cors_config.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                // Url keeps a trailing slash that browsers never send in Origin
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .allow_credentials(cors_config.allow_credentials);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router: every `/api` route, the docs, CORS and request tracing.
///
/// The token gate is not part of the returned router; [`Application`] wraps it around the
/// whole service so that it also covers unknown `/api` paths.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    use api::handlers::{auth, budgets, expenses, summaries};

    let api_routes = Router::new()
        // Authentication
        .route("/register/", post(auth::register))
        .route("/login/", post(auth::login))
        .route("/secure/", get(auth::secure))
        // Expenses
        .route("/expenses/add/", post(expenses::add_expense))
        .route("/expenses/category/{category}/", get(expenses::list_by_category))
        .route("/expenses/{id}/", delete(expenses::delete_expense))
        .route("/expenses/{id}/description/", put(expenses::update_description))
        // Summaries
        .route("/expenses/summary/month/", get(summaries::monthly_expense))
        .route("/expenses/yearly-summary/{year}/", get(summaries::yearly_summary))
        .route("/expenses/daily-summary/", get(summaries::daily_summary))
        .route("/expenses/search/", get(summaries::search))
        .route("/expenses/category-breakdown/", get(summaries::category_breakdown))
        .route("/expenses/highest/", get(summaries::highest))
        .route("/expenses/total/", get(summaries::total))
        .route("/expenses/category-current-month/", get(summaries::category_current_month))
        .route("/expenses/history/", get(summaries::history))
        .route("/expenses/summary-by-date/", get(summaries::summary_by_date))
        .route("/expenses/monthly/", get(summaries::monthly_category))
        .route("/expenses/monthly-category/", get(summaries::monthly_category))
        // Budgets
        .route("/budget/set/", post(budgets::set_budget))
        .route("/budget/get/", get(budgets::get_budget))
        .route("/budget/status/", get(budgets::budget_status))
        .route("/budget/delete/{category}/", delete(budgets::delete_budget))
        .route("/expenses/budget/total/", get(budgets::total_budget))
        .fallback(|| async { Error::not_found("Not found") })
        .with_state(state.clone());

    let router = Router::new()
        .nest("/api", api_routes)
        .route("/docs/openapi.json", get(|| async { axum::Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;
    let router = router.layer(cors_layer);

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The assembled service and the resources it owns.
///
/// 1. **Create**: [`Application::new`] connects to the database, runs migrations and builds the router
/// 2. **Serve**: [`Application::serve`] binds to the configured address and handles requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests finish, then the
///    pool is closed and telemetry is flushed
pub struct Application {
    router: Router,
    app_state: AppState,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Like [`Application::new`], but reuse an existing pool when one is given (tests).
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        debug!("Starting expensectl with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => {
                migrator().run(&pool).await?;
                pool
            }
            None => setup_database(&config).await?,
        };

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(&app_state)?;

        Ok(Self {
            router,
            app_state,
            config,
            pool,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        // Apply middleware before path matching for tests
        let middleware = from_fn_with_state(self.app_state, require_token);
        let service = middleware.layer(self.router).into_make_service();
        axum_test::TestServer::new(service).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "expensectl listening on http://{}, docs at http://localhost:{}/docs",
            bind_addr, self.config.port
        );

        // Apply middleware before path matching
        let middleware = from_fn_with_state(self.app_state, require_token);
        let service = middleware.layer(self.router);

        // Run the server with graceful shutdown
        axum::serve(listener, service.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
