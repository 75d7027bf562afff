use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use forum_feed_relay::config::Config;
use forum_feed_relay::rss::{HttpFeedSource, Relay};
use forum_feed_relay::targets::load_targets;
use forum_feed_relay::telegram::TelegramClient;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    info!("Starting forum-feed-relay");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    if config.bot_token.is_empty() {
        warn!("TOKEN is not set - every Telegram call will fail");
    }

    let targets = load_targets(&config.feeds_file).context("Failed to load feed targets")?;
    for target in &targets {
        info!(
            feed = %target.key,
            url = %target.feed_url,
            chat_id = %target.chat_id,
            thread_id = target.thread_id,
            "Feed target"
        );
    }

    info!(
        history = %config.history_path.display(),
        interval_secs = config.poll_interval.as_secs(),
        policy = ?config.delivery_policy,
        "Configuration loaded"
    );

    let source =
        HttpFeedSource::new(config.http_timeout).context("Failed to build feed HTTP client")?;
    let sink = TelegramClient::new(
        &config.telegram_api_url,
        &config.bot_token,
        config.http_timeout,
    )
    .context("Failed to build Telegram client")?;

    let relay = Relay::new(&config, targets, source, sink);

    tokio::select! {
        result = relay.run_forever() => result?,
        () = shutdown_signal() => info!("Shutting down..."),
    }

    info!("Shutdown complete");

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,forum_feed_relay=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
