use anyhow::Result;
use async_trait::async_trait;
use jarvis_types::{ChatMessage, ThreadDocument, ThreadRef, TicketDraft};

/// Fetches the messages of a thread, root first.
#[async_trait]
pub trait ThreadSource: Send + Sync {
    async fn fetch_thread(&self, thread: &ThreadRef) -> Result<Vec<ChatMessage>>;
}

/// Resolves a user id to a human-readable name.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// `Ok(None)` when the id is not on the roster
    async fn display_name(&self, user_id: &str) -> Result<Option<String>>;
}

/// Turns a formatted thread into a ticket draft.
#[async_trait]
pub trait TicketDrafter: Send + Sync {
    async fn draft(&self, document: &ThreadDocument) -> Result<TicketDraft>;
}

/// A ticket ready to be filed in the document store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub title: String,
    /// Free text; converted to rich text by the store
    pub body: String,
    pub status_id: String,
    pub reporter: String,
}

/// Files tickets and returns the URL of the created page.
#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<String>;
}
