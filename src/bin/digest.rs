use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use reddit_relay::config::Config;
use reddit_relay::digest::Digest;
use reddit_relay::platform::telegram::TelegramClient;
use reddit_relay::reddit::RedditClient;
use reddit_relay::scheduler::Scheduler;
use reddit_relay::translate::StubTranslator;

#[tokio::main]
async fn main() -> Result<()> {
    reddit_relay::init_logging();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).context("Failed to load configuration")?;
    let credentials = config.credentials()?;

    info!("Configuration loaded successfully");
    info!("  Destination chat: {}", credentials.chat_id);
    info!("  Subreddit: r/{}", config.digest.subreddit);
    info!("  Limit: {}", config.digest.limit);

    let digest = Arc::new(Digest::new(
        Arc::new(RedditClient::new(&config.reddit)),
        Arc::new(TelegramClient::new(&credentials)),
        Arc::new(StubTranslator),
        config.digest.subreddit.clone(),
        config.digest.limit,
    ));

    let Some(schedule) = config.digest.schedule.as_deref() else {
        let sent = digest.run_once().await?;
        info!("Digest done, {} post(s) sent", sent);
        return Ok(());
    };

    let mut scheduler = Scheduler::new().await?;
    scheduler.add_digest_job(schedule, digest).await?;
    scheduler.start().await?;

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    scheduler.shutdown().await
}
