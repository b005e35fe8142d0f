use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use reddit_relay::config::Config;
use reddit_relay::platform::telegram::TelegramClient;
use reddit_relay::reddit::RedditClient;
use reddit_relay::relay::{Poller, Relay};
use reddit_relay::translate::StubTranslator;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    reddit_relay::init_logging();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).context("Failed to load configuration")?;
    let credentials = config.credentials()?;

    info!("Configuration loaded successfully");
    info!("  Destination chat: {}", credentials.chat_id);
    info!("  Long-poll wait: {}s", config.telegram.poll_timeout_secs);

    let telegram = Arc::new(TelegramClient::new(&credentials));
    let relay = Relay::new(
        Arc::new(RedditClient::new(&config.reddit)),
        telegram.clone(),
        Arc::new(StubTranslator),
    );
    let mut poller = Poller::new(telegram, relay, config.telegram.poll_timeout_secs);

    info!("Relay is starting...");
    let result = poller.run().await;
    match result {
        Ok(never) => match never {},
        Err(e) => Err(e.context(format!("Poll loop stopped at offset {}", poller.offset()))),
    }
}
