//! Slack side of the bot: Web API calls for threads, the user roster and
//! replies, plus verification of signed event deliveries.

pub mod client;
pub mod signature;

pub use client::{SlackClient, SLACK_API_BASE};
pub use signature::{SignatureError, SignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};
