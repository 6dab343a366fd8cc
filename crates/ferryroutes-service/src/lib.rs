//! Ferry route query HTTP service.
//!
//! # Endpoints
//!
//! - `GET /routes`, `GET /routes/{origin}/{destination}`
//! - `GET /prices/{route_id}`, `GET /vessel/{route_id}`
//! - `GET /duration/{origin}/{destination}`
//! - `GET /availability/{origin}/{destination}/{date}`
//! - `GET /indirect-route/{origin}/{destination}`
//! - `GET /schedule/{origin}`
//! - `GET /cheapest-route/{origin}/{destination}`, `GET /most-expensive-route`
//! - `GET /suggestions?origin=&date=`
//! - `POST /api/v1/query` - dispatch any query operation (`?format=text` for rendered text)
//! - `POST /api/v1/chat` - ferry assistant backed by the hosted chat model
//! - `GET /chat/?query=` - single-turn chat for the web frontend
//! - `GET /metrics`, `GET /health/live`, `GET /health/ready`
//!
//! # Configuration
//!
//! - `FERRY_DATA_PATH` - SQLite dataset (default: `routes.db`)
//! - `SERVICE_PORT` - HTTP port (default: 8000)
//! - `CORS_ALLOW_ORIGIN` - frontend origin (default: `http://localhost:3000`)
//! - `LOG_FORMAT`, `RUST_LOG`, `METRICS_ENABLED`, `METRICS_PATH`
//! - `GROQ_API_KEY`, `CHAT_MODEL`, `CHAT_API_BASE`, `CHAT_TIMEOUT_SECS`, `CHAT_HISTORY_TURNS`

pub mod handlers;

use std::env;
use std::path::PathBuf;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use ferryroutes_service_shared::{
    health_live, health_ready, metrics_handler, AppState, MetricsLayer, REQUEST_ID_HEADER,
};

pub const DEFAULT_DATA_PATH: &str = "routes.db";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Startup settings read from the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub data_path: PathBuf,
    pub port: u16,
    pub cors_allow_origin: String,
    pub metrics_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            port: DEFAULT_PORT,
            cors_allow_origin: DEFAULT_CORS_ORIGIN.to_string(),
            metrics_path: "/metrics".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            data_path: env::var("FERRY_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            port: env::var("SERVICE_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            cors_allow_origin: env::var("CORS_ALLOW_ORIGIN").unwrap_or(defaults.cors_allow_origin),
            metrics_path: env::var("METRICS_PATH").unwrap_or(defaults.metrics_path),
        }
    }
}

/// CORS policy admitting the configured frontend origin with credentials.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, header::InvalidHeaderValue> {
    let origin = HeaderValue::from_str(origin)?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .allow_credentials(true))
}

/// Build the application router over `state`.
pub fn router(state: AppState, config: &ServiceConfig, cors: CorsLayer) -> Router {
    Router::new()
        .route("/routes", get(handlers::list_routes))
        .route("/routes/{origin}/{destination}", get(handlers::routes_between))
        .route("/prices/{route_id}", get(handlers::prices))
        .route("/duration/{origin}/{destination}", get(handlers::duration))
        .route(
            "/availability/{origin}/{destination}/{date}",
            get(handlers::availability),
        )
        .route(
            "/indirect-route/{origin}/{destination}",
            get(handlers::indirect_route),
        )
        .route("/vessel/{route_id}", get(handlers::vessels))
        .route("/schedule/{origin}", get(handlers::schedule))
        .route(
            "/cheapest-route/{origin}/{destination}",
            get(handlers::cheapest_route),
        )
        .route("/most-expensive-route", get(handlers::most_expensive_route))
        .route("/suggestions", get(handlers::suggestions))
        .route("/api/v1/query", post(handlers::run_query))
        .route("/api/v1/chat", post(handlers::chat))
        .route("/chat", get(handlers::chat_query))
        .route("/chat/", get(handlers::chat_query))
        .route(&config.metrics_path, get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(MetricsLayer)
        .layer(cors)
        .with_state(state)
}
