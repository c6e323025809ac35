//! Student Roster API Server
//!
//! REST API over the student record store: list/search/paginate, get,
//! create, update and delete students, and attach subject marks.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::sync::Arc;
use storage::{RecordStore, StudentFilter};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
mod routes;
pub mod service;

pub use config::{ConfigError, LogFormat, ServerConfig};
pub use error::{ErrorBody, ServiceError};
pub use service::StudentService;

/// Application state shared across handlers
pub struct AppState {
    /// Student service over the process-wide store handle
    pub service: StudentService,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus render handle, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state over an open store
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            service: StudentService::new(store),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `/metrics`
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
    pub metrics: RosterMetrics,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub database: ComponentHealth,
}

/// Individual component health
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Roster metrics
#[derive(Debug, Serialize)]
pub struct RosterMetrics {
    pub student_count: u64,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/api/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route(
            "/api/students",
            get(routes::students::list_students).post(routes::students::create_student),
        )
        .route(
            "/api/students/:id",
            get(routes::students::get_student)
                .put(routes::students::update_student)
                .delete(routes::students::delete_student),
        )
        .route("/api/students/:id/marks", post(routes::marks::add_mark))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root_handler() -> &'static str {
    "Student Management API is running..."
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let store = state.service.store();
    let check = match store.ping().await {
        Ok(()) => store.count_students(&StudentFilter::default()).await,
        Err(e) => Err(e),
    };
    let (database, student_count) = match check {
        Ok(count) => (
            ComponentHealth {
                status: "ok".to_string(),
                detail: None,
            },
            count,
        ),
        Err(e) => {
            warn!("Record store health check failed: {}", e);
            (
                ComponentHealth {
                    status: "error".to_string(),
                    detail: Some(e.to_string()),
                },
                0,
            )
        }
    };

    let (code, status) = if database.detail.is_none() {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let response = HealthResponse {
        status: status.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: ComponentStatus { database },
        metrics: RosterMetrics { student_count },
    };

    (code, Json(response))
}

/// Prometheus exposition handler
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// Initialize logging
pub fn init_logging(
    level: Level,
    format: LogFormat,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    match format {
        LogFormat::Text => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_target(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Json => {
            let subscriber = FmtSubscriber::builder()
                .json()
                .with_max_level(level)
                .with_target(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    }
}

/// Connect the record store and run the server until it stops.
///
/// A store that cannot be reached aborts startup with an error.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let store = match storage::connect(&config.database_url).await {
        Ok(store) => {
            info!("Connected to record store");
            store
        }
        Err(e) => {
            error!("Error connecting to record store: {}", e);
            return Err(e.into());
        }
    };

    let mut state = AppState::new(store);
    if config.metrics {
        let handle = PrometheusBuilder::new().install_recorder()?;
        state = state.with_metrics(handle);
    }
    let app = create_router(Arc::new(state));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running on port {}", listener.local_addr()?.port());

    axum::serve(listener, app).await?;

    Ok(())
}
