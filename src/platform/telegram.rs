use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, Recipient, UpdateKind};
use tracing::{debug, error};

use crate::config::Credentials;
use crate::platform::{IncomingUpdate, MediaType, Publisher, UpdateSource};

/// Telegram Bot API client bound to one destination chat.
#[derive(Clone)]
pub struct TelegramClient {
    bot: Bot,
    chat: Recipient,
}

impl TelegramClient {
    pub fn new(credentials: &Credentials) -> Self {
        // No client-side timeout: the long-poll wait is bounded by the server.
        let bot = Bot::with_client(&credentials.bot_token, reqwest::Client::new());
        Self {
            bot,
            chat: parse_recipient(&credentials.chat_id),
        }
    }

    /// Point the client at a different Bot API server (e.g. a local mock).
    pub fn with_api_url(mut self, url: &str) -> Result<Self> {
        let url = reqwest::Url::parse(url)
            .with_context(|| format!("Invalid Telegram API url: {}", url))?;
        self.bot = self.bot.set_api_url(url);
        Ok(self)
    }
}

/// Numeric ids address chats directly; anything else is a channel username.
fn parse_recipient(chat_id: &str) -> Recipient {
    match chat_id.trim().parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) => Recipient::ChannelUsername(chat_id.trim().to_string()),
    }
}

fn to_incoming(update: Update) -> IncomingUpdate {
    let text = match &update.kind {
        UpdateKind::Message(msg) => msg.text().map(str::to_string),
        _ => None,
    };
    IncomingUpdate {
        id: update.id.0,
        text,
    }
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn get_updates(&self, offset: u32, timeout_secs: u32) -> Result<Vec<IncomingUpdate>> {
        let offset = i32::try_from(offset).unwrap_or(i32::MAX);
        let updates = self
            .bot
            .get_updates()
            .offset(offset)
            .timeout(timeout_secs)
            .await
            .context("Failed to fetch Telegram updates")?;

        Ok(updates.into_iter().map(to_incoming).collect())
    }
}

#[async_trait]
impl Publisher for TelegramClient {
    async fn publish_media(&self, media_url: &str, caption: &str, media_type: MediaType) {
        let url = match reqwest::Url::parse(media_url) {
            Ok(url) => url,
            Err(e) => {
                error!("Failed to send media: invalid url {}: {}", media_url, e);
                return;
            }
        };

        let result = match media_type {
            MediaType::Photo => self
                .bot
                .send_photo(self.chat.clone(), InputFile::url(url))
                .caption(caption)
                .await
                .map(|_| ()),
            MediaType::Video => self
                .bot
                .send_video(self.chat.clone(), InputFile::url(url))
                .caption(caption)
                .await
                .map(|_| ()),
        };

        match result {
            Ok(()) => debug!("Sent {} {}", media_type, media_url),
            Err(e) => error!("Failed to send media: {}", e),
        }
    }

    async fn publish_text(&self, text: &str) {
        if let Err(e) = self.bot.send_message(self.chat.clone(), text).await {
            error!("Failed to send message: {}", e);
        }
    }
}
