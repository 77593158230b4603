use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use jarvis_pipeline::{MessageEvent, PipelineOutcome};
use jarvis_slack::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Mount point used unless `slack.events_path` says otherwise
pub const DEFAULT_EVENTS_PATH: &str = "/slack/events";

const EVENT_CALLBACK: &str = "event_callback";
const MESSAGE_EVENT: &str = "message";

/// Outer envelope of an Events API delivery
#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    challenge: Option<Value>,
    #[serde(default)]
    event_id: Option<String>,
    #[serde(default)]
    event: Option<Value>,
}

/// Acknowledgement body: the echoed challenge, or `{"status": "OK"}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventAck {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub challenge: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl EventAck {
    fn challenge(challenge: Value) -> Self {
        Self {
            challenge: Some(challenge),
            status: None,
        }
    }

    fn ok() -> Self {
        Self {
            challenge: None,
            status: Some("OK".to_string()),
        }
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Slack Events API webhook
///
/// Verifies the request signature, answers the URL verification handshake
/// and runs message events through the ticket pipeline before acknowledging.
#[utoipa::path(
    post,
    path = "/slack/events",
    request_body(content = String, content_type = "application/json", description = "Raw Events API payload"),
    params(
        ("X-Slack-Request-Timestamp" = String, Header, description = "Unix time the request was sent"),
        ("X-Slack-Signature" = String, Header, description = "v0 HMAC-SHA256 signature")
    ),
    responses(
        (status = 200, description = "Event acknowledged", body = EventAck),
        (status = 400, description = "Malformed payload"),
        (status = 401, description = "Missing, stale or invalid signature")
    ),
    tag = "slack"
)]
pub async fn slack_events(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<EventAck>> {
    state.verifier.verify(
        header(&headers, TIMESTAMP_HEADER),
        header(&headers, SIGNATURE_HEADER),
        &body,
    )?;

    let envelope: EventEnvelope = serde_json::from_slice(&body)?;

    if let Some(challenge) = envelope.challenge {
        tracing::info!("Answering URL verification challenge");
        return Ok(Json(EventAck::challenge(challenge)));
    }

    if envelope.kind.as_deref() == Some(EVENT_CALLBACK) {
        let event = envelope
            .event
            .ok_or_else(|| ApiError::BadRequest("event_callback without event".to_string()))?;
        dispatch(&state, envelope.event_id.as_deref(), event).await;
    } else {
        tracing::debug!(kind = ?envelope.kind, "Ignoring non-callback payload");
    }

    Ok(Json(EventAck::ok()))
}

async fn dispatch(state: &AppState, event_id: Option<&str>, event: Value) {
    let event: MessageEvent = match serde_json::from_value(event) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(event_id, error = %e, "Skipping event with unexpected shape");
            return;
        }
    };
    if event.event_type != MESSAGE_EVENT {
        tracing::debug!(event_id, event_type = %event.event_type, "Skipping non-message event");
        return;
    }

    match state.pipeline.handle(event_id, &event).await {
        PipelineOutcome::Filed { url, delivery } => {
            tracing::info!(event_id, url = %url, delivered = delivery.is_delivered(), "Ticket filed");
        }
        PipelineOutcome::DraftFailed { reason, delivery }
        | PipelineOutcome::StoreFailed { reason, delivery } => {
            tracing::warn!(event_id, reason = %reason, delivered = delivery.is_delivered(), "Ticket not filed");
        }
        outcome => tracing::debug!(event_id, ?outcome, "Event not actionable"),
    }
}
