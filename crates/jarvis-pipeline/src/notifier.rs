use async_trait::async_trait;
use jarvis_types::ThreadRef;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const RATE_LIMIT_MARKER: &str = "ratelimited";

/// Failure from a single delivery attempt
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("ratelimited: {0}")]
    RateLimited(String),

    #[error("{0}")]
    Failed(String),
}

impl DeliveryError {
    /// Structured rate-limit variant, or any failure whose message carries the
    /// `ratelimited` marker.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::RateLimited(_) => true,
            Self::Failed(message) => message.to_lowercase().contains(RATE_LIMIT_MARKER),
        }
    }
}

/// Posts a text reply into a conversation thread.
#[async_trait]
pub trait MessagePoster: Send + Sync {
    async fn post_message(&self, thread: &ThreadRef, text: &str) -> Result<(), DeliveryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    #[default]
    Fixed,
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(5),
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            backoff: Backoff::Fixed,
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sleep before the retry that follows failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential => {
                let exponent = attempt.saturating_sub(1).min(16);
                self.delay.saturating_mul(1u32 << exponent)
            }
        }
    }
}

/// What happened to one notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { attempts: u32 },
    /// Still rate limited after the last allowed attempt
    RateLimited { attempts: u32 },
    Failed { attempts: u32, reason: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Delivered { attempts }
            | Self::RateLimited { attempts }
            | Self::Failed { attempts, .. } => *attempts,
        }
    }
}

/// Delivers thread replies, retrying only when the poster reports rate limiting.
#[derive(Clone)]
pub struct RetryingNotifier {
    poster: Arc<dyn MessagePoster>,
    policy: RetryPolicy,
}

impl RetryingNotifier {
    pub fn new(poster: Arc<dyn MessagePoster>, policy: RetryPolicy) -> Self {
        Self { poster, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Never returns an error; the outcome says whether the text was posted.
    pub async fn notify(&self, thread: &ThreadRef, text: &str) -> DeliveryOutcome {
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.poster.post_message(thread, text).await {
                Ok(()) => return DeliveryOutcome::Delivered { attempts: attempt },
                Err(err) if err.is_rate_limited() => {
                    if attempt == max_attempts {
                        break;
                    }
                    let delay = self.policy.delay_after(attempt);
                    tracing::warn!(
                        channel = %thread.channel,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limit hit, retrying delivery"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    tracing::error!(channel = %thread.channel, attempt, error = %err, "Failed to post message");
                    return DeliveryOutcome::Failed {
                        attempts: attempt,
                        reason: err.to_string(),
                    };
                }
            }
        }

        tracing::error!(
            channel = %thread.channel,
            max_attempts,
            text,
            "Exceeded maximum retries, message not posted"
        );
        DeliveryOutcome::RateLimited {
            attempts: max_attempts,
        }
    }
}
