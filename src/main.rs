mod commands;
mod config;
mod feedback;
mod platform;
mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::Bot;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,grimoire_relay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Configuration loaded successfully");
    info!("  WebApp URL: {}", config.webapp_url);
    info!("  Static files: {}", config.static_dir.display());
    for warning in config.warnings() {
        warn!("{}", warning);
    }

    let config = Arc::new(config);
    let bot = Bot::new(&config.bot_token);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    let app = server::router(AppState {
        config: config.clone(),
        sender: Arc::new(bot.clone()),
    });
    let mut http = tokio::spawn(server::serve(listener, app));

    info!("Bot is starting...");
    tokio::select! {
        result = platform::telegram::run(bot, config) => {
            result?;
            info!("Bot stopped, shutting down HTTP server");
            http.abort();
        }
        joined = &mut http => {
            match joined {
                Ok(Ok(())) => warn!("HTTP server exited unexpectedly"),
                Ok(Err(e)) => error!("{:#}", e),
                Err(e) => error!("HTTP server task failed: {}", e),
            }
            anyhow::bail!("HTTP server stopped");
        }
    }

    Ok(())
}
