//! Files Jarvis tickets as pages in a Notion database.
//!
//! [`NotionClient`] implements [`jarvis_pipeline::TicketStore`]; the request
//! body is assembled by [`payload::PageRequest`].

pub mod client;
pub mod payload;

pub use client::{page_url, NotionClient, NOTION_API_BASE, NOTION_VERSION};
pub use payload::{Annotations, PageRequest, RichText};
