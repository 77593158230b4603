use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Logs one line per request; failures are raised to warn level
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let retry_num = req
        .headers()
        .get("x-slack-retry-num")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let start = Instant::now();

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = %duration_ms,
            retry_num = ?retry_num,
            "Request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = %duration_ms,
            retry_num = ?retry_num,
            "Request processed"
        );
    }

    response
}
