use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Effective settings worth checking from the outside
    pub settings: BTreeMap<String, String>,
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let config = &state.config;
    let mut settings = BTreeMap::new();
    settings.insert("events_path".to_string(), config.slack.events_path.clone());
    settings.insert("llm_model".to_string(), config.llm.model.clone());
    settings.insert(
        "dedup_backend".to_string(),
        format!("{:?}", config.dedup.backend).to_lowercase(),
    );
    settings.insert(
        "trigger_keywords".to_string(),
        config.trigger.keywords.join(","),
    );

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        settings,
    })
}
