use anyhow::{anyhow, Result};
use async_trait::async_trait;
use jarvis_llm::{ChatClient, ChatOptions, ChatRequest, Message};
use jarvis_types::{ThreadDocument, TicketDraft};
use std::sync::Arc;

use crate::traits::TicketDrafter;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = "You are an award winning Quality Assurance engineer.";

fn user_prompt(thread: &str) -> String {
    format!(
        "Write a draft bug ticket based on the data in this Slack thread: {thread}. \
         Include the following sections: current state, ideal state, steps to reproduce, references, and notes. \
         Do not use any bold formatting. \
         Only use Markdown formatting for hyperlinks (e.g., [link text](url)) so that text like 'Loom Video' or 'Dashboard Link' becomes clickable. \
         The first sentence will be the title, and should be less than 45 characters long. Do not mention that it's the title. \
         Ensure clarity, avoid complex or industry-specific jargon, and use concise, pithy language."
    )
}

/// Drafts tickets with a chat-completion model.
pub struct LlmTicketDrafter {
    client: Arc<dyn ChatClient>,
    model: String,
    options: ChatOptions,
}

impl LlmTicketDrafter {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            options: ChatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    fn request(&self, document: &ThreadDocument) -> ChatRequest {
        ChatRequest::new(
            self.model.clone(),
            vec![
                Message::system(SYSTEM_PROMPT),
                Message::human(user_prompt(document.as_str())),
            ],
        )
        .with_options(self.options.clone())
    }
}

#[async_trait]
impl TicketDrafter for LlmTicketDrafter {
    async fn draft(&self, document: &ThreadDocument) -> Result<TicketDraft> {
        let response = self.client.chat(self.request(document)).await?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                model = %self.model,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Ticket drafted"
            );
        }

        response
            .content
            .filter(|content| !content.trim().is_empty())
            .map(TicketDraft::new)
            .ok_or_else(|| anyhow!("model {} returned no content", self.model))
    }
}
