//! Back-office API for a garment manufacturer.
//!
//! Four areas, one binary: order intake (buyers, orders), purchasing
//! (purchases with kind-specific line items), production tracking
//! (machines, daily production records) and the warehouse store
//! (entries, logs and the derived inventory view in [`stock`]).

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod stock;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::handlers::AppServices;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: Arc<AppConfig>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db: Arc<DbPool>, config: AppConfig, services: AppServices) -> Self {
        Self {
            db,
            config: Arc::new(config),
            services,
        }
    }
}

/// Everything under `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::buyers::router())
        .merge(handlers::orders::router())
        .merge(handlers::purchases::router())
        .merge(handlers::store_entries::router())
        .merge(handlers::store_logs::router())
        .merge(handlers::inventory::router())
        .merge(handlers::productions::router())
        .merge(handlers::machines::router())
}

/// Builds the full application router with middleware applied.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .nest("/api/v1", api_v1_routes())
        .route("/health", get(health))
        .route("/status", get(service_status))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    match config.cors_allowed_origins.as_deref() {
        Some(origins) if !origins.trim().is_empty() => {
            let parsed: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(origin, "ignoring unparseable CORS origin");
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(parsed))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        _ => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}

/// Liveness plus a database round trip.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(err) => {
            tracing::error!(error = %err, "health check failed to reach database");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}

async fn service_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
    }))
}

async fn openapi_json() -> impl IntoResponse {
    Json(openapi::ApiDoc::openapi())
}
