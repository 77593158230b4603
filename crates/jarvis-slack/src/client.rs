use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use jarvis_pipeline::{DeliveryError, IdentityDirectory, MessagePoster, ThreadSource};
use jarvis_types::{ChatMessage, ThreadRef};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

pub const SLACK_API_BASE: &str = "https://slack.com/api";

const PAGE_LIMIT: &str = "200";
const MAX_PAGES: usize = 50;

#[derive(Debug, Deserialize)]
struct AuthTestResponse {
    ok: bool,
    user_id: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: Option<String>,
}

impl ResponseMetadata {
    fn cursor(self) -> Option<String> {
        self.next_cursor.filter(|cursor| !cursor.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct RepliesResponse {
    ok: bool,
    #[serde(default)]
    messages: Vec<ChatMessage>,
    error: Option<String>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct UsersListResponse {
    ok: bool,
    #[serde(default)]
    members: Vec<SlackMember>,
    error: Option<String>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct SlackMember {
    id: String,
    real_name: Option<String>,
    #[serde(default)]
    profile: Option<SlackProfile>,
}

#[derive(Debug, Deserialize)]
struct SlackProfile {
    display_name: Option<String>,
}

impl SlackMember {
    /// Real name, falling back to the profile display name
    fn name(self) -> Option<String> {
        let non_blank = |s: &String| !s.trim().is_empty();
        self.real_name
            .filter(non_blank)
            .or_else(|| self.profile.and_then(|p| p.display_name).filter(non_blank))
    }
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
}

fn api_error(error: Option<String>) -> String {
    error.unwrap_or_else(|| "unknown error".to_string())
}

/// Slack Web API client authenticated with a bot token.
#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl SlackClient {
    pub fn new(bot_token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("jarvis-ticket-bot"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("failed to create slack api client")?;

        Ok(Self {
            http,
            api_base: SLACK_API_BASE.to_string(),
            bot_token: bot_token.into().trim().to_string(),
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    async fn get_json<T: DeserializeOwned>(&self, method: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self
            .http
            .get(self.url(method))
            .bearer_auth(&self.bot_token)
            .query(query)
            .send()
            .await
            .with_context(|| format!("slack api {method} request failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(method, status = status.as_u16(), "Slack API request failed");
            bail!("slack api {method} failed with status {}: {}", status.as_u16(), body);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode slack {method}"))
    }

    /// User id of the bot itself
    pub async fn auth_test(&self) -> Result<String> {
        let response = self
            .http
            .post(self.url("auth.test"))
            .bearer_auth(&self.bot_token)
            .send()
            .await
            .context("slack api auth.test request failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("slack api auth.test failed with status {}", status.as_u16());
        }

        let parsed: AuthTestResponse = response
            .json()
            .await
            .context("failed to decode slack auth.test")?;
        if !parsed.ok {
            bail!("slack auth.test failed: {}", api_error(parsed.error));
        }

        parsed
            .user_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| anyhow!("slack auth.test did not return user_id"))
    }

    /// Every message of a thread, following pagination cursors.
    pub async fn conversation_replies(&self, thread: &ThreadRef) -> Result<Vec<ChatMessage>> {
        let mut messages = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut query = vec![
                ("channel", thread.channel.as_str()),
                ("ts", thread.thread_ts.as_str()),
                ("limit", PAGE_LIMIT),
            ];
            if let Some(cursor) = cursor.as_deref() {
                query.push(("cursor", cursor));
            }

            let page: RepliesResponse = self.get_json("conversations.replies", &query).await?;
            if !page.ok {
                bail!("slack conversations.replies failed: {}", api_error(page.error));
            }
            messages.extend(page.messages);

            cursor = page.response_metadata.and_then(ResponseMetadata::cursor);
            if cursor.is_none() {
                break;
            }
            tracing::debug!(channel = %thread.channel, fetched = messages.len(), "Fetching next replies page");
        }

        tracing::debug!(
            channel = %thread.channel,
            thread_ts = %thread.thread_ts,
            count = messages.len(),
            "Fetched thread replies"
        );
        Ok(messages)
    }

    /// Map of user id to real name (or display name) for the whole workspace.
    pub async fn users_list(&self) -> Result<HashMap<String, String>> {
        let mut users = HashMap::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut query = vec![("limit", PAGE_LIMIT)];
            if let Some(cursor) = cursor.as_deref() {
                query.push(("cursor", cursor));
            }

            let page: UsersListResponse = self.get_json("users.list", &query).await?;
            if !page.ok {
                bail!("slack users.list failed: {}", api_error(page.error));
            }
            for member in page.members {
                let id = member.id.clone();
                if let Some(name) = member.name() {
                    users.insert(id, name);
                }
            }

            cursor = page.response_metadata.and_then(ResponseMetadata::cursor);
            if cursor.is_none() {
                break;
            }
        }

        tracing::debug!(count = users.len(), "Loaded workspace roster");
        Ok(users)
    }

    /// Post `text` as a reply in `thread`.
    ///
    /// HTTP 429 and the `ratelimited` API error map to
    /// [`DeliveryError::RateLimited`]; everything else is a plain failure.
    pub async fn post_message(&self, thread: &ThreadRef, text: &str) -> Result<(), DeliveryError> {
        let payload = json!({
            "channel": thread.channel,
            "thread_ts": thread.thread_ts,
            "text": text,
        });

        let response = self
            .http
            .post(self.url("chat.postMessage"))
            .bearer_auth(&self.bot_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DeliveryError::Failed(format!("slack chat.postMessage request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("unspecified")
                .to_string();
            tracing::warn!(channel = %thread.channel, retry_after = %retry_after, "Slack chat.postMessage rate limited");
            return Err(DeliveryError::RateLimited(format!(
                "slack chat.postMessage returned 429, retry after {retry_after}s"
            )));
        }
        if !status.is_success() {
            tracing::warn!(channel = %thread.channel, status = status.as_u16(), "Slack chat.postMessage failed");
            return Err(DeliveryError::Failed(format!(
                "slack chat.postMessage failed with status {}",
                status.as_u16()
            )));
        }

        let parsed: PostMessageResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::Failed(format!("failed to decode slack chat.postMessage: {e}")))?;

        match (parsed.ok, parsed.error) {
            (true, _) => Ok(()),
            (false, Some(error)) if error == "ratelimited" => Err(DeliveryError::RateLimited(error)),
            (false, error) => Err(DeliveryError::Failed(format!(
                "slack chat.postMessage failed: {}",
                api_error(error)
            ))),
        }
    }
}

#[async_trait]
impl ThreadSource for SlackClient {
    async fn fetch_thread(&self, thread: &ThreadRef) -> Result<Vec<ChatMessage>> {
        self.conversation_replies(thread).await
    }
}

#[async_trait]
impl IdentityDirectory for SlackClient {
    async fn display_name(&self, user_id: &str) -> Result<Option<String>> {
        let mut users = self.users_list().await?;
        Ok(users.remove(user_id))
    }
}

#[async_trait]
impl MessagePoster for SlackClient {
    async fn post_message(&self, thread: &ThreadRef, text: &str) -> Result<(), DeliveryError> {
        SlackClient::post_message(self, thread, text).await
    }
}
