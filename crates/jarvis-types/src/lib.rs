pub mod config;
pub mod message;
pub mod ticket;

pub use config::{DedupBackend, DedupConfig, TriggerConfig};
pub use message::{ChatMessage, MessageEvent, NormalizedMessage, ThreadRef};
pub use ticket::{DashboardLinks, RichTextRun, ThreadDocument, TicketDraft, UNKNOWN_USER};
