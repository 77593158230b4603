use axum::{extract::State, Json};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::routes::{events, health};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(health::health_check, events::slack_events),
    components(schemas(health::HealthResponse, events::EventAck)),
    tags(
        (name = "health", description = "Service status"),
        (name = "slack", description = "Slack Events API webhook")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// The document with the webhook listed under the path it is mounted at.
    pub fn for_events_path(events_path: &str) -> utoipa::openapi::OpenApi {
        let mut doc = Self::openapi();
        if events_path != events::DEFAULT_EVENTS_PATH {
            if let Some(item) = doc.paths.paths.remove(events::DEFAULT_EVENTS_PATH) {
                doc.paths.paths.insert(events_path.to_string(), item);
            }
        }
        doc
    }
}

pub async fn openapi_json(State(state): State<Arc<AppState>>) -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::for_events_path(&state.config.slack.events_path))
}
