use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jarvis_slack::SignatureError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request signature: {0}")]
    Signature(#[from] SignatureError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Signature(ref e) => {
                tracing::warn!(error = %e, "Rejected unsigned or forged request");
                (StatusCode::UNAUTHORIZED, "Invalid request signature".to_string())
            }
            ApiError::BadRequest(_) | ApiError::Json(_) => {
                tracing::debug!(error = %self, "Rejected event payload");
                (StatusCode::BAD_REQUEST, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
