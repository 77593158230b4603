use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jarvis_api::{build_router, config::Config, state::AppState};
use jarvis_llm::{ChatClient, OpenAIClient};
use jarvis_notion::NotionClient;
use jarvis_pipeline::{
    EventDeduplicator, LinkExtractor, LlmTicketDrafter, RetryPolicy, TicketPipeline,
};
use jarvis_slack::SlackClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Jarvis ticket bot");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    let slack = Arc::new(
        SlackClient::new(config.slack_bot_token.clone(), config.slack.request_timeout())?
            .with_api_base(&config.slack.api_base),
    );
    let bot_user_id = slack
        .auth_test()
        .await
        .context("Slack auth.test failed; check SLACK_BOT_TOKEN")?;
    tracing::info!(bot_user_id = %bot_user_id, "Authenticated with Slack");

    let mut openai = OpenAIClient::new(config.openai_api_key.clone())?;
    if let Some(base_url) = &config.llm.base_url {
        openai = openai.with_base_url(base_url);
    }
    let llm_client: Arc<dyn ChatClient> = Arc::new(openai);
    tracing::info!(model = %config.llm.model, "LLM client ready");

    let notion = NotionClient::with_options(
        config.notion_api_token.clone(),
        config.notion_database_id.clone(),
        &config.notion.version,
        jarvis_notion::client::DEFAULT_TIMEOUT,
    )?
    .with_api_base(&config.notion.api_base);

    let extractor = LinkExtractor::new(&config.dashboard.host)
        .with_context(|| format!("Invalid dashboard host: {}", config.dashboard.host))?;

    let pipeline = TicketPipeline::builder()
        .deduplicator(EventDeduplicator::from_config(&config.dedup))
        .trigger(config.trigger.clone())
        .bot_user_id(bot_user_id)
        .extractor(extractor)
        .status_id(config.notion.status_id.clone())
        .retry_policy(RetryPolicy::from(&config.notifier))
        .thread_source(slack.clone())
        .identity_directory(slack.clone())
        .drafter(Arc::new(LlmTicketDrafter::new(llm_client, config.llm.model.clone())))
        .ticket_store(Arc::new(notion))
        .poster(slack)
        .build()?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let events_path = config.slack.events_path.clone();

    let state = Arc::new(AppState::new(config, pipeline));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Slack events: http://{}{}", addr, events_path);
    tracing::info!("API docs: http://{}/api/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
