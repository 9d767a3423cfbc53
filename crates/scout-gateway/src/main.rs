use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use scout_agent::anthropic::AnthropicProvider;
use scout_agent::ResearchAgent;
use scout_calendar::{CalendarScanner, GoogleCalendar};
use scout_context::ContextStore;
use scout_core::ScoutConfig;
use scout_slack::{MessageSink, SlackClient};

mod app;
mod http;
mod messages;
mod notifier;
mod research;

#[derive(Debug, Parser)]
#[command(name = "scout-gateway", about = "Slack research-brief bot")]
struct Cli {
    /// Path to scout.toml (defaults to ~/.scout/scout.toml).
    #[arg(long, env = "SCOUT_CONFIG")]
    config: Option<String>,

    /// Serve Slack requests only; do not scan calendars.
    #[arg(long)]
    no_calendar: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scout_gateway=info,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = ScoutConfig::load_with_dotenv(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        ScoutConfig::default()
    });

    if config.slack.bot_token.is_empty() {
        warn!("slack.bot_token is empty; outbound Slack calls will fail");
    }
    if config.slack.signing_secret.is_empty() {
        warn!("slack.signing_secret is empty; every Slack request will be rejected");
    }
    if config.anthropic.api_key.is_empty() {
        warn!("anthropic.api_key is empty; research requests will fail");
    }

    let contexts = Arc::new(ContextStore::open(&config.storage, &config.context)?);

    info!(model = %config.anthropic.model, base_url = %config.anthropic.base_url, "LLM provider: Anthropic");
    let provider = Arc::new(AnthropicProvider::from_config(&config.anthropic));
    let agent = ResearchAgent::from_config(provider, &config.anthropic, &config.research);

    let slack: Arc<dyn MessageSink> = Arc::new(SlackClient::new(
        config.slack.bot_token.clone(),
        Some(config.slack.api_base.clone()),
    ));

    let research = research::Research::new(agent, contexts, slack.clone());

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    if cli.no_calendar {
        info!("calendar scanning disabled");
    } else {
        let scanner = CalendarScanner::new(
            &config.storage,
            config.calendar.clone(),
            Arc::new(GoogleCalendar::new()),
            Arc::new(notifier::SlackMeetingNotifier::new(slack)),
        );
        let interval = Duration::from_secs(config.calendar.scan_interval_secs.max(60));
        tokio::spawn(async move { scanner.run(interval, shutdown_rx).await });
    }

    let addr: SocketAddr = format!("{}:{}", config.gateway.bind, config.gateway.port).parse()?;
    let state = Arc::new(app::AppState::new(config, research));
    let router = app::build_router(state);

    info!("Scout gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    Ok(())
}
