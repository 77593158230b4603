use anyhow::{anyhow, Result};
use jarvis_types::TriggerConfig;
use std::sync::Arc;

use crate::dedup::EventDeduplicator;
use crate::extract::LinkExtractor;
use crate::notifier::{MessagePoster, RetryPolicy, RetryingNotifier};
use crate::pipeline::TicketPipeline;
use crate::traits::{IdentityDirectory, ThreadSource, TicketDrafter, TicketStore};

/// Builder for [`TicketPipeline`]; collaborators are required, the rest has defaults
pub struct TicketPipelineBuilder {
    dedup: EventDeduplicator,
    trigger: TriggerConfig,
    bot_user_id: Option<String>,
    extractor: LinkExtractor,
    status_id: Option<String>,
    retry_policy: RetryPolicy,
    threads: Option<Arc<dyn ThreadSource>>,
    identities: Option<Arc<dyn IdentityDirectory>>,
    drafter: Option<Arc<dyn TicketDrafter>>,
    store: Option<Arc<dyn TicketStore>>,
    poster: Option<Arc<dyn MessagePoster>>,
}

impl TicketPipelineBuilder {
    pub fn new() -> Self {
        Self {
            dedup: EventDeduplicator::default(),
            trigger: TriggerConfig::default(),
            bot_user_id: None,
            extractor: LinkExtractor::default(),
            status_id: None,
            retry_policy: RetryPolicy::default(),
            threads: None,
            identities: None,
            drafter: None,
            store: None,
            poster: None,
        }
    }

    pub fn deduplicator(mut self, dedup: EventDeduplicator) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn trigger(mut self, trigger: TriggerConfig) -> Self {
        self.trigger = trigger;
        self
    }

    /// Messages from this user are never treated as triggers
    pub fn bot_user_id(mut self, id: impl Into<String>) -> Self {
        self.bot_user_id = Some(id.into());
        self
    }

    pub fn extractor(mut self, extractor: LinkExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn status_id(mut self, status_id: impl Into<String>) -> Self {
        self.status_id = Some(status_id.into());
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn thread_source(mut self, threads: Arc<dyn ThreadSource>) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn identity_directory(mut self, identities: Arc<dyn IdentityDirectory>) -> Self {
        self.identities = Some(identities);
        self
    }

    pub fn drafter(mut self, drafter: Arc<dyn TicketDrafter>) -> Self {
        self.drafter = Some(drafter);
        self
    }

    pub fn ticket_store(mut self, store: Arc<dyn TicketStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn poster(mut self, poster: Arc<dyn MessagePoster>) -> Self {
        self.poster = Some(poster);
        self
    }

    pub fn build(self) -> Result<TicketPipeline> {
        let threads = self.threads.ok_or_else(|| anyhow!("Thread source is required"))?;
        let identities = self
            .identities
            .ok_or_else(|| anyhow!("Identity directory is required"))?;
        let drafter = self.drafter.ok_or_else(|| anyhow!("Ticket drafter is required"))?;
        let store = self.store.ok_or_else(|| anyhow!("Ticket store is required"))?;
        let poster = self.poster.ok_or_else(|| anyhow!("Message poster is required"))?;
        let status_id = self.status_id.ok_or_else(|| anyhow!("Ticket status id is required"))?;

        Ok(TicketPipeline {
            dedup: self.dedup,
            trigger: self.trigger,
            bot_user_id: self.bot_user_id,
            extractor: self.extractor,
            status_id,
            threads,
            identities,
            drafter,
            store,
            notifier: RetryingNotifier::new(poster, self.retry_policy),
        })
    }
}

impl Default for TicketPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
