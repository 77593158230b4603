use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Keywords that must all appear in a message for the bot to file a ticket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriggerConfig {
    pub keywords: Vec<String>,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            keywords: vec![
                "jarvis".to_string(),
                "ticket".to_string(),
                "please".to_string(),
            ],
        }
    }
}

impl TriggerConfig {
    pub fn new(keywords: Vec<String>) -> Self {
        Self { keywords }
    }

    /// Case-insensitive: every keyword must occur somewhere in `text`.
    pub fn matches(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.keywords
            .iter()
            .all(|keyword| lowered.contains(&keyword.to_lowercase()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DedupBackend {
    #[default]
    Memory,
    Ttl,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    #[serde(default)]
    pub backend: DedupBackend,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_capacity() -> usize {
    10_000
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            backend: DedupBackend::default(),
            ttl_secs: default_ttl_secs(),
            capacity: default_capacity(),
        }
    }
}

impl DedupConfig {
    pub fn with_backend(mut self, backend: DedupBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = ttl.as_secs();
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}
