use jarvis_types::{ChatMessage, MessageEvent, ThreadDocument, ThreadRef, TriggerConfig, UNKNOWN_USER};
use std::sync::Arc;

use crate::builder::TicketPipelineBuilder;
use crate::dedup::EventDeduplicator;
use crate::extract::LinkExtractor;
use crate::format::format_thread;
use crate::notifier::{DeliveryOutcome, RetryingNotifier};
use crate::traits::{IdentityDirectory, NewTicket, ThreadSource, TicketDrafter, TicketStore};

pub const FAILURE_NOTICE: &str = "🚨 Failed to create Notion ticket. Check logs.";

pub fn success_notice(url: &str) -> String {
    format!("🎉 Notion ticket created: {url}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotAMessage,
    OwnMessage,
    NoTrigger,
    MissingThread,
}

/// Result of handling one inbound message event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The event id was already handled
    Duplicate,
    Ignored(IgnoreReason),
    Filed {
        url: String,
        delivery: DeliveryOutcome,
    },
    DraftFailed {
        reason: String,
        delivery: DeliveryOutcome,
    },
    StoreFailed {
        reason: String,
        delivery: DeliveryOutcome,
    },
}

/// Turns a triggering chat message into a filed ticket and an in-thread reply.
pub struct TicketPipeline {
    pub(crate) dedup: EventDeduplicator,
    pub(crate) trigger: TriggerConfig,
    pub(crate) bot_user_id: Option<String>,
    pub(crate) extractor: LinkExtractor,
    pub(crate) status_id: String,
    pub(crate) threads: Arc<dyn ThreadSource>,
    pub(crate) identities: Arc<dyn IdentityDirectory>,
    pub(crate) drafter: Arc<dyn TicketDrafter>,
    pub(crate) store: Arc<dyn TicketStore>,
    pub(crate) notifier: RetryingNotifier,
}

impl TicketPipeline {
    pub fn builder() -> TicketPipelineBuilder {
        TicketPipelineBuilder::new()
    }

    pub fn deduplicator(&self) -> &EventDeduplicator {
        &self.dedup
    }

    /// Handle a message event end to end.
    ///
    /// Never fails: collaborator errors are logged and folded into the outcome,
    /// and the thread is told when filing did not work.
    pub async fn handle(&self, event_id: Option<&str>, event: &MessageEvent) -> PipelineOutcome {
        if let Some(id) = event_id {
            if !self.dedup.admit(id) {
                tracing::debug!(event_id = id, "Skipping redelivered event");
                return PipelineOutcome::Duplicate;
            }
        }

        let thread = match self.triggering_thread(event) {
            Ok(thread) => thread,
            Err(reason) => return PipelineOutcome::Ignored(reason),
        };

        let reporter = self.reporter_name(event.user.as_deref()).await;
        tracing::info!(
            channel = %thread.channel,
            thread_ts = %thread.thread_ts,
            reporter = %reporter,
            "Processing thread"
        );

        let messages = self.fetch_messages(&thread).await;
        let document = self.assemble_document(&messages, &reporter);
        tracing::debug!(document = %document, "Formatted thread");

        let draft = match self.drafter.draft(&document).await {
            Ok(draft) => draft,
            Err(e) => {
                tracing::error!(error = %e, "Failed to draft ticket");
                let delivery = self.notifier.notify(&thread, FAILURE_NOTICE).await;
                return PipelineOutcome::DraftFailed {
                    reason: e.to_string(),
                    delivery,
                };
            }
        };

        let ticket = NewTicket {
            title: draft.title(),
            body: draft.body().to_string(),
            status_id: self.status_id.clone(),
            reporter,
        };

        match self.store.create_ticket(&ticket).await {
            Ok(url) => {
                tracing::info!(url = %url, title = %ticket.title, "Ticket created");
                let delivery = self.notifier.notify(&thread, &success_notice(&url)).await;
                PipelineOutcome::Filed { url, delivery }
            }
            Err(e) => {
                tracing::error!(error = %e, title = %ticket.title, "Failed to create ticket");
                let delivery = self.notifier.notify(&thread, FAILURE_NOTICE).await;
                PipelineOutcome::StoreFailed {
                    reason: e.to_string(),
                    delivery,
                }
            }
        }
    }

    /// Normalize the thread, harvest its links and format it for drafting.
    pub fn assemble_document(&self, messages: &[ChatMessage], reporter: &str) -> ThreadDocument {
        let (normalized, links) = self.extractor.process(messages);
        format_thread(&normalized, &links, reporter)
    }

    fn triggering_thread(&self, event: &MessageEvent) -> Result<ThreadRef, IgnoreReason> {
        if event.event_type != "message" {
            return Err(IgnoreReason::NotAMessage);
        }
        if let (Some(bot), Some(user)) = (self.bot_user_id.as_deref(), event.user.as_deref()) {
            if bot == user {
                return Err(IgnoreReason::OwnMessage);
            }
        }
        if !self.trigger.matches(event.text_or_empty()) {
            return Err(IgnoreReason::NoTrigger);
        }
        event.thread_ref().ok_or(IgnoreReason::MissingThread)
    }

    async fn reporter_name(&self, user_id: Option<&str>) -> String {
        let Some(user_id) = user_id else {
            return UNKNOWN_USER.to_string();
        };
        match self.identities.display_name(user_id).await {
            Ok(Some(name)) if !name.trim().is_empty() => name,
            Ok(_) => UNKNOWN_USER.to_string(),
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Identity lookup failed");
                UNKNOWN_USER.to_string()
            }
        }
    }

    async fn fetch_messages(&self, thread: &ThreadRef) -> Vec<ChatMessage> {
        match self.threads.fetch_thread(thread).await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::error!(channel = %thread.channel, error = %e, "Error fetching thread messages");
                Vec::new()
            }
        }
    }
}
