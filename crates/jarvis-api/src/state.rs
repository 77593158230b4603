use jarvis_pipeline::TicketPipeline;
use jarvis_slack::SignatureVerifier;
use std::sync::Arc;

use crate::config::Config;

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<TicketPipeline>,
    pub verifier: SignatureVerifier,
}

impl AppState {
    pub fn new(config: Config, pipeline: TicketPipeline) -> Self {
        let verifier = SignatureVerifier::new(
            config.slack_signing_secret.clone(),
            config.slack.signature_tolerance_secs,
        );
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            verifier,
        }
    }
}
