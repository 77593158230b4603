pub mod builder;
pub mod dedup;
pub mod drafter;
pub mod extract;
pub mod format;
pub mod notifier;
pub mod pipeline;
pub mod rich_text;
pub mod traits;

pub use builder::TicketPipelineBuilder;
pub use dedup::{EventDeduplicator, InMemoryEventStore, SeenEventStore, TtlEventStore};
pub use drafter::LlmTicketDrafter;
pub use extract::LinkExtractor;
pub use format::format_thread;
pub use notifier::{Backoff, DeliveryError, DeliveryOutcome, MessagePoster, RetryPolicy, RetryingNotifier};
pub use pipeline::{IgnoreReason, PipelineOutcome, TicketPipeline};
pub use rich_text::segment_markdown;
pub use traits::{IdentityDirectory, NewTicket, ThreadSource, TicketDrafter, TicketStore};

pub use jarvis_types::{
    ChatMessage, DashboardLinks, MessageEvent, NormalizedMessage, RichTextRun, ThreadDocument,
    ThreadRef, TicketDraft, TriggerConfig,
};
