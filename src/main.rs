//! Hangman bot entrypoint wiring the Reddit inbox, the word generator, and the game store.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod dao;
mod error;
mod platform;
mod services;
mod state;

use config::BotConfig;
use dao::json_file::JsonFileRepository;
use platform::reddit::{RedditClient, RedditConfig};
use services::{
    poll_loop::PollLoop, turn_service::TurnProcessor, word_source::HttpWordSource,
};
use state::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = BotConfig::load();

    let repository = Arc::new(JsonFileRepository::new(
        config.active_path.clone(),
        config.archive_path.clone(),
    ));
    // A corrupt active file stops startup instead of being overwritten by an empty store.
    let store = SessionStore::load(repository.clone(), config.initial_lives)
        .await
        .with_context(|| format!("loading active games from {}", config.active_path.display()))?;
    info!(
        active = %repository.active_path().display(),
        archive = %repository.archive_path().display(),
        games = store.len(),
        "session store ready"
    );

    let reddit_config =
        RedditConfig::from_env(config.user_agent.clone()).context("reading Reddit credentials")?;
    let reddit = RedditClient::connect(reddit_config)
        .await
        .context("authenticating with Reddit")?;
    info!(handle = %config.bot_handle, "authenticated with Reddit");

    let http = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .build()
        .context("building word source client")?;
    let words = HttpWordSource::new(http, config.word_api_url.clone(), config.min_word_len);
    let processor = TurnProcessor::new(Arc::new(words), config.footer.clone());

    let mut bot = PollLoop::new(
        Arc::new(reddit),
        processor,
        store,
        config.bot_handle.clone(),
        config.poll_interval,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown requested, finishing current pass");
        let _ = shutdown_tx.send(true);
    });

    bot.run(shutdown_rx).await;

    if let Err(err) = bot.store().persist_active().await {
        error!(error = %err, "failed to persist active games on shutdown");
    }
    info!(active = bot.store().len(), "hangman bot stopped");

    Ok(())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = match signal(SignalKind::terminate()) {
            Ok(term) => term,
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
