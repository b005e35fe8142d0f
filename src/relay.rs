use std::convert::Infallible;
use std::sync::Arc;

use anyhow::{Context, Result};
use lazy_regex::lazy_regex;
use tracing::{debug, info};

use crate::platform::{IncomingUpdate, Publisher, UpdateSource};
use crate::reddit::ContentSource;
use crate::translate::Translator;

static RE_REDDIT_LINK: lazy_regex::Lazy<regex::Regex> =
    lazy_regex!(r"https?://(?:www\.)?reddit\.com/\S+");

/// First Reddit submission link in `text`, if any.
pub fn extract_reddit_link(text: &str) -> Option<&str> {
    RE_REDDIT_LINK.find(text).map(|m| m.as_str())
}

/// Republishes the post behind a Reddit link found in an incoming message.
pub struct Relay {
    source: Arc<dyn ContentSource>,
    publisher: Arc<dyn Publisher>,
    translator: Arc<dyn Translator>,
}

impl Relay {
    pub fn new(
        source: Arc<dyn ContentSource>,
        publisher: Arc<dyn Publisher>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            source,
            publisher,
            translator,
        }
    }

    /// Updates without text or without a Reddit link are ignored. A failed
    /// post fetch is returned to the caller.
    pub async fn handle(&self, update: &IncomingUpdate) -> Result<()> {
        let Some(text) = update.text.as_deref() else {
            debug!("Update {} has no message text, skipping", update.id);
            return Ok(());
        };

        let Some(link) = extract_reddit_link(text) else {
            debug!("Update {} has no Reddit link, skipping", update.id);
            return Ok(());
        };

        info!("Relaying {} (update {})", link, update.id);

        let post = self
            .source
            .fetch_post(link)
            .await
            .with_context(|| format!("Failed to fetch post {}", link))?;

        let caption = self.translator.translate(&post.title);
        match &post.media {
            Some(media) => {
                self.publisher
                    .publish_media(&media.url, &caption, media.media_type)
                    .await
            }
            None => self.publisher.publish_text(&caption).await,
        }

        Ok(())
    }
}

/// Long-poll loop owning the update offset.
pub struct Poller {
    updates: Arc<dyn UpdateSource>,
    relay: Relay,
    offset: u32,
    timeout_secs: u32,
}

impl Poller {
    pub fn new(updates: Arc<dyn UpdateSource>, relay: Relay, timeout_secs: u32) -> Self {
        Self {
            updates,
            relay,
            offset: 0,
            timeout_secs,
        }
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// One long-poll round: fetch pending updates and handle them one by
    /// one, in the order received. Returns how many updates arrived.
    pub async fn poll_once(&mut self) -> Result<usize> {
        let updates = self
            .updates
            .get_updates(self.offset, self.timeout_secs)
            .await?;

        if !updates.is_empty() {
            debug!("Received {} update(s) at offset {}", updates.len(), self.offset);
        }

        for update in &updates {
            // The offset never moves backwards.
            self.offset = self.offset.max(update.id.saturating_add(1));
            self.relay.handle(update).await?;
        }

        Ok(updates.len())
    }

    /// Poll forever. Only returns when a fetch fails.
    pub async fn run(&mut self) -> Result<Infallible> {
        info!("Polling for updates (wait budget {}s)", self.timeout_secs);
        loop {
            self.poll_once().await?;
        }
    }
}
