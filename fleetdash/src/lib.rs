//! # fleetdash: Reporting API for the fleet admin dashboard
//!
//! `fleetdash` serves the read-only figures behind the fleet platform's admin dashboard: headline
//! statistics, seven-day activity charts, category distributions and a browsable user list. It
//! never writes to the record store; every figure is computed from the current rows at request
//! time.
//!
//! ## Architecture
//!
//! - **Web framework**: [Axum](https://github.com/tokio-rs/axum) for HTTP routing and middleware
//! - **Database**: PostgreSQL via [SQLx](https://github.com/launchbadge/sqlx), read-only
//! - **Authentication**: bearer access tokens from the platform's identity provider, optionally a
//!   trusted proxy header
//! - **API Documentation**: OpenAPI via [utoipa](https://github.com/juhaku/utoipa), rendered with Scalar
//!
//! ## Record store capabilities
//!
//! Deployments differ in which optional attributes their record store has (membership types,
//! trip activity, notification and message status, a payment ledger). Which ones exist is stated
//! in configuration, see [`config::CapabilitiesConfig`], and figures that depend on a missing
//! attribute are reported as zero.
//!
//! ## Request Flow
//!
//! 1. **Authentication**: [`auth::current_user`] resolves the caller from a bearer token or proxy header
//! 2. **Authorization**: [`auth::permissions::RequiresPermission`] enforces staff-only access
//! 3. **Queries**: Repositories in [`db::handlers`] issue a handful of aggregate queries
//! 4. **Shaping**: [`reports`] fills windows and computes growth; results are returned as JSON
//!
//! ## Getting Started
//!
//! ```no_run
//! use fleetdash::{Application, Config};
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = fleetdash::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     fleetdash::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async { tokio::signal::ctrl_c().await.ok(); }).await
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod payments;
pub mod reports;
pub mod telemetry;
mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{config::CorsOrigin, openapi::ApiDoc, payments::RevenueLedger};
use axum::{Router, ServiceExt, extract::Request, http, http::HeaderValue, routing::get};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    normalize_path::NormalizePathLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::UserId;

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `db`: PostgreSQL connection pool onto the record store
/// - `config`: Application configuration loaded from file/environment
/// - `ledger`: Source of revenue figures, chosen once at startup from `payment`
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .ledger(payments::create_ledger(config.payment.as_ref(), &config.status_values))
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub ledger: Arc<dyn RevenueLedger>,
}

/// Get the database migrator for the reporting schema.
///
/// Production record stores are migrated by the platform that owns them; this is applied only
/// when `database.run_migrations` is set, and by the test harness.
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Connect to the record store and optionally apply the bundled schema.
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let pool = config.database.pool.pool_options().connect(&config.database.url).await?;

    if config.database.run_migrations {
        info!("Applying bundled schema migrations");
        migrator().run(&pool).await?;
    }

    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;

    // A wildcard admits every origin; tower-http refuses `*` inside an explicit list
    let allow_origin = if cors_config
        .allowed_origins
        .iter()
        .any(|origin| matches!(origin, CorsOrigin::Wildcard))
    {
        if cors_config.allow_credentials {
            anyhow::bail!("CORS wildcard origin cannot be combined with allow_credentials");
        }
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([http::Method::GET, http::Method::OPTIONS])
        .allow_headers([
            http::header::AUTHORIZATION,
            http::header::CONTENT_TYPE,
            http::header::ACCEPT,
        ])
        .allow_credentials(config.auth.security.cors.allow_credentials);

    if let Some(max_age) = config.auth.security.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// - Dashboard routes under `/api/dashboard`
/// - The caller's profile at `/api/auth/me`
/// - `/healthz`, OpenAPI JSON and the Scalar docs UI
/// - Optional Prometheus metrics at `/internal/metrics`
/// - CORS and tracing middleware
///
/// Trailing slashes are handled by [`Application`], which wraps this router in a path normalizer.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let dashboard_routes = Router::new()
        .route("/stats", get(api::handlers::stats::get_stats))
        .route("/charts/users-growth", get(api::handlers::charts::users_growth))
        .route("/charts/notifications", get(api::handlers::charts::notifications))
        .route("/charts/vehicle-types", get(api::handlers::charts::vehicle_types))
        .route("/charts/memberships", get(api::handlers::charts::memberships))
        .route("/charts/revenue", get(api::handlers::charts::revenue))
        .route("/charts/trips", get(api::handlers::charts::trips))
        .route("/users", get(api::handlers::users::list_users))
        .route("/users/blocked", get(api::handlers::users::list_blocked_users));

    let auth_routes = Router::new().route("/me", get(api::handlers::auth::get_me));

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { axum::Json(ApiDoc::openapi()) }))
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/auth", auth_routes)
        .with_state(state.clone())
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;
    let mut router = router.layer(cors_layer);

    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns the router and database pool.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] connects to the record store, optionally migrates, and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal is received, drains requests and closes the pool
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = setup_database(&config).await?;
        Self::with_pool(config, pool)
    }

    /// Create an application over an existing pool (no migrations are run)
    pub fn with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        debug!("Starting dashboard API with configuration: {:#?}", config);

        let ledger = payments::create_ledger(config.payment.as_ref(), &config.status_values);
        let state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .ledger(ledger)
            .build();

        let router = build_router(&state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        // Normalize before routing, as in `serve`
        let service = NormalizePathLayer::trim_trailing_slash().layer(self.router);
        let service = ServiceExt::<Request>::into_make_service(service);
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
            "Dashboard API listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Normalize before path matching, so `/stats/` and `/stats` are the same route
        let service = NormalizePathLayer::trim_trailing_slash().layer(self.router);

        axum::serve(listener, ServiceExt::<Request>::into_make_service(service))
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, create_test_config};
    use axum::http::StatusCode;

    #[test]
    fn test_cors_layer_from_config() {
        let mut config = create_test_config();
        assert!(create_cors_layer(&config).is_ok());

        config.auth.security.cors.allowed_origins = vec![
            CorsOrigin::Url("https://admin.fleet.io".parse().unwrap()),
            CorsOrigin::Wildcard,
        ];
        assert!(create_cors_layer(&config).is_ok());

        config.auth.security.cors.allow_credentials = true;
        assert!(create_cors_layer(&config).is_err());

        config.auth.security.cors.allowed_origins = vec![CorsOrigin::Url("https://admin.fleet.io/".parse().unwrap())];
        config.auth.security.cors.allow_credentials = true;
        assert!(create_cors_layer(&config).is_ok());
    }

    #[sqlx::test]
    #[test_log::test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    async fn test_router_builds_with_default_cors(pool: PgPool) {
        let config = Config {
            enable_metrics: false,
            ..Default::default()
        };
        assert!(matches!(
            config.auth.security.cors.allowed_origins.as_slice(),
            [CorsOrigin::Wildcard]
        ));

        let state = AppState::builder()
            .db(pool)
            .ledger(payments::create_ledger(None, &config.status_values))
            .config(config)
            .build();
        assert!(build_router(&state).is_ok());
    }

    #[sqlx::test]
    #[test_log::test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    async fn test_wildcard_origin_is_echoed_as_any(pool: PgPool) {
        let (server, _config) = create_test_app(pool, create_test_config()).await;

        let response = server
            .get("/healthz")
            .add_header("origin", "https://ops.fleet.io")
            .await;
        response.assert_status_ok();
        assert_eq!(response.header("access-control-allow-origin"), "*");
    }

    #[sqlx::test]
    #[test_log::test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    async fn test_healthz_and_docs(pool: PgPool) {
        let (server, _config) = create_test_app(pool, create_test_config()).await;

        let response = server.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");

        let response = server.get("/api-docs/openapi.json").await;
        response.assert_status_ok();
        let doc: serde_json::Value = response.json();
        assert!(doc["paths"]["/api/dashboard/stats"].is_object());
    }

    #[sqlx::test]
    #[test_log::test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    async fn test_metrics_endpoint_toggle(pool: PgPool) {
        let mut config = create_test_config();
        config.enable_metrics = false;
        let (server, _config) = create_test_app(pool, config).await;

        let response = server.get("/internal/metrics").expect_failure().await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    #[cfg_attr(not(feature = "integration-tests"), ignore)]
    async fn test_unknown_path_is_not_found(pool: PgPool) {
        let (server, _config) = create_test_app(pool, create_test_config()).await;
        let response = server.get("/api/dashboard/nope/").expect_failure().await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
