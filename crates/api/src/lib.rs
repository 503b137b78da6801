//! Cardiac Risk API Server
//!
//! REST API for authentication, health profiles, and cardiac risk
//! prediction backed by pre-trained ONNX models.

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod extract;
pub mod rate_limit;
mod routes;

use crate::config::{AppConfig, ServerConfig};
use crate::rate_limit::{create_governor_config, RateLimitConfig};
use alerting::{AlertManager, SmsGateway};
use inference_engine::ModelRegistry;
use storage::Repository;
use user_auth::{TokenConfig, TokenService};

/// Application state shared across handlers
///
/// Immutable after startup; the models are read-only.
pub struct AppState {
    /// Storage repository
    pub repository: Repository,
    /// Loaded models
    pub models: ModelRegistry,
    /// Access token issuer/verifier
    pub tokens: TokenService,
    /// SMS alerting
    pub alerts: AlertManager,
    /// Prometheus handle, when the recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

/// Shared handle passed to every handler
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Create new application state
    pub fn new(
        repository: Repository,
        models: ModelRegistry,
        tokens: TokenService,
        alerts: AlertManager,
    ) -> Self {
        Self {
            repository,
            models,
            tokens,
            alerts,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Attach a Prometheus handle for /metrics
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentStatus,
    pub metrics: SystemMetrics,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub database: ComponentHealth,
    pub models: BTreeMap<&'static str, ComponentHealth>,
}

/// Individual component health
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: String,
}

impl ComponentHealth {
    fn from_ok(ok: bool, failure: &str) -> Self {
        Self {
            status: if ok { "ok" } else { failure }.to_string(),
        }
    }
}

/// System metrics
#[derive(Debug, Serialize)]
pub struct SystemMetrics {
    pub prediction_count: i64,
}

/// Root message
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
}

/// Create the application router
///
/// `rate_limit` throttles the `/auth` routes per peer IP when given.
pub fn create_router(state: SharedState, rate_limit: Option<&RateLimitConfig>) -> Router {
    let mut auth = Router::new()
        .route("/auth/signup", post(routes::auth::signup))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/me", get(routes::auth::me));

    if let Some(config) = rate_limit {
        match create_governor_config(config) {
            Some(governor) => auth = auth.layer(GovernorLayer { config: governor }),
            None => warn!("Invalid rate limit settings {:?}, auth routes unthrottled", config),
        }
    }

    let mut router = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/predict", post(routes::predict::acute))
        .route("/predict/acute", post(routes::predict::acute))
        .route("/predict/lifestyle", post(routes::predict::lifestyle))
        .route("/predict/synthetic", post(routes::predict::synthetic))
        .route(
            "/profile",
            get(routes::profile::get_profile).post(routes::profile::upsert_profile),
        )
        .route(
            "/profile/",
            get(routes::profile::get_profile).post(routes::profile::upsert_profile),
        )
        .route("/profile/history", get(routes::profile::history))
        .merge(auth);

    if state.metrics.is_some() {
        router = router.route("/metrics", get(metrics_handler));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Cardiac Prediction API is running".to_string(),
    })
}

/// Health check handler
async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let database_ok = state.repository.ping().await.is_ok();
    let models: BTreeMap<_, _> = state
        .models
        .status()
        .into_iter()
        .map(|(kind, loaded)| (kind.as_str(), ComponentHealth::from_ok(loaded, "not_loaded")))
        .collect();
    let all_ok = database_ok && models.values().all(|m| m.status == "ok");

    let response = HealthResponse {
        status: if all_ok { "healthy" } else { "degraded" }.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: ComponentStatus {
            database: ComponentHealth::from_ok(database_ok, "error"),
            models,
        },
        metrics: SystemMetrics {
            prediction_count: state.repository.prediction_count().await.unwrap_or(0),
        },
    };

    Json(response)
}

async fn metrics_handler(State(state): State<SharedState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Initialize logging
pub fn init_logging(config: &ServerConfig) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let level = config.log_level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if config.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
}

/// Build state from configuration: database, models, tokens, alerting
pub async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let repository =
        Repository::connect(&config.database.url, config.database.max_connections).await?;
    let models = ModelRegistry::load(&config.models);

    if config.auth.secret_key == TokenConfig::default().secret_key {
        warn!("Using the built-in development secret; set CARDIO__AUTH__SECRET_KEY");
    }
    let tokens = TokenService::new(&config.auth);
    info!("Access tokens valid for {} min", tokens.ttl().num_minutes());

    let gateway = SmsGateway::from_config(&config.sms)?;
    let delivery = if gateway.is_mock() { "log only" } else { "twilio" };
    let alerts = AlertManager::new(config.alerts.clone(), gateway);
    info!("SMS alerts above {:.2} ({})", alerts.threshold(), delivery);

    Ok(AppState::new(repository, models, tokens, alerts))
}

/// Run the server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let mut state = build_state(&config).await?;
    if config.server.metrics {
        let handle = PrometheusBuilder::new().install_recorder()?;
        state = state.with_metrics(handle);
    }

    let rate_limit = config.rate_limit.enabled.then_some(&config.rate_limit);
    let app = create_router(Arc::new(state), rate_limit);

    info!("Starting API server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
