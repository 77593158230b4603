use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use jarvis_pipeline::{NewTicket, TicketStore};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::time::Duration;

use crate::payload::PageRequest;

pub const NOTION_API_BASE: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";

const PAGE_HOST: &str = "https://www.notion.so";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct CreatedPage {
    id: Option<String>,
}

/// Public URL of a page: the id with its dashes removed.
pub fn page_url(page_id: &str) -> String {
    format!("{PAGE_HOST}/{}", page_id.replace('-', ""))
}

/// Creates ticket pages in one Notion database.
pub struct NotionClient {
    http_client: reqwest::Client,
    api_base: String,
    database_id: String,
}

impl NotionClient {
    pub fn new(token: impl Into<String>, database_id: impl Into<String>) -> Result<Self> {
        Self::with_options(token, database_id, NOTION_VERSION, DEFAULT_TIMEOUT)
    }

    pub fn with_options(
        token: impl Into<String>,
        database_id: impl Into<String>,
        version: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let token = token.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .context("Invalid Notion token format")?,
        );
        headers.insert(
            HeaderName::from_static("notion-version"),
            HeaderValue::from_str(version).context("Invalid Notion-Version header")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            api_base: NOTION_API_BASE.to_string(),
            database_id: database_id.into(),
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    /// Create a page and return its id.
    pub async fn create_page(&self, page: &PageRequest) -> Result<String> {
        let url = format!("{}/pages", self.api_base);

        let response = self
            .http_client
            .post(&url)
            .json(page)
            .send()
            .await
            .context("Failed to send request to Notion")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            bail!("Notion API error ({}): {}", status, error_text);
        }

        let created: CreatedPage = response
            .json()
            .await
            .context("Failed to parse Notion response")?;

        created
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| anyhow!("Notion response did not include a page id"))
    }
}

#[async_trait]
impl TicketStore for NotionClient {
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<String> {
        let page = PageRequest::for_ticket(&self.database_id, ticket);
        let id = self.create_page(&page).await?;
        let url = page_url(&id);
        tracing::debug!(page_id = %id, url = %url, "Notion page created");
        Ok(url)
    }
}
