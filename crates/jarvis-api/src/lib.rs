//! HTTP surface of the Jarvis bot: the signed Slack Events API webhook, a
//! health check and the OpenAPI document.

pub mod config;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::{
    http::{HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::routes::{events, health};
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let config = state.config.clone();

    let timed = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/openapi.json", get(openapi::openapi_json))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    // No timeout on the events route: the pipeline runs inline and must reach
    // its in-thread notification once the event id is marked seen.
    Router::new()
        .route(&config.slack.events_path, post(events::slack_events))
        .merge(timed)
        .layer(axum_middleware::from_fn(middleware::logging::log_request))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if !config.cors.enabled {
        return CorsLayer::new();
    }

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if config.cors.origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors
        .origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}
