use config::{Config as ConfigLoader, ConfigError, Environment, File};
use jarvis_pipeline::{Backoff, RetryPolicy};
use jarvis_types::{DedupConfig, TriggerConfig};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub trigger: TriggerConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub notion: NotionConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub slack_bot_token: String,
    #[serde(default)]
    pub slack_signing_secret: String,
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default)]
    pub notion_api_token: String,
    #[serde(default)]
    pub notion_database_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    #[serde(default)]
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackConfig {
    pub api_base: String,
    pub events_path: String,
    pub signature_tolerance_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            api_base: jarvis_slack::SLACK_API_BASE.to_string(),
            events_path: crate::routes::events::DEFAULT_EVENTS_PATH.to_string(),
            signature_tolerance_secs: 300,
            request_timeout_secs: 30,
        }
    }
}

impl SlackConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    pub host: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: jarvis_pipeline::extract::DEFAULT_DASHBOARD_HOST.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    /// OpenAI-compatible endpoint; the public API when unset
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: jarvis_pipeline::drafter::DEFAULT_MODEL.to_string(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotionConfig {
    pub api_base: String,
    pub version: String,
    /// Status option given to every new ticket
    pub status_id: String,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_base: jarvis_notion::NOTION_API_BASE.to_string(),
            version: jarvis_notion::NOTION_VERSION.to_string(),
            status_id: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    pub max_attempts: u32,
    pub delay_secs: u64,
    #[serde(default)]
    pub backoff: Backoff,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            delay_secs: policy.delay.as_secs(),
            backoff: policy.backoff,
        }
    }
}

impl From<&NotifierConfig> for RetryPolicy {
    fn from(config: &NotifierConfig) -> Self {
        RetryPolicy::new(config.max_attempts, Duration::from_secs(config.delay_secs))
            .with_backoff(config.backoff)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::Message(format!("{name} environment variable is required")))
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. `JARVIS_<SECTION>__<KEY>` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("JARVIS")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("trigger.keywords")
                    .with_list_parse_key("cors.origins")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        cfg.slack_bot_token = required_env("SLACK_BOT_TOKEN")?;
        cfg.slack_signing_secret = required_env("SLACK_SIGNING_SECRET")?;
        cfg.openai_api_key = required_env("OPENAI_API_KEY")?;
        cfg.notion_api_token = required_env("NOTION_API_TOKEN")?;
        cfg.notion_database_id = required_env("NOTION_DATABASE_ID")?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notion.status_id.trim().is_empty() {
            return Err(ConfigError::Message("notion.status_id must be set".to_string()));
        }
        if self.trigger.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::Message(
                "trigger.keywords needs at least one keyword".to_string(),
            ));
        }
        if !self.slack.events_path.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "slack.events_path must start with '/': {}",
                self.slack.events_path
            )));
        }
        Ok(())
    }
}
