pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// An inbound update, reduced to what the relay needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingUpdate {
    pub id: u32,
    /// `message.text`; `None` for updates without a text message
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Photo,
    Video,
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Photo => write!(f, "photo"),
            MediaType::Video => write!(f, "video"),
        }
    }
}

/// Long-polls the messaging backend for updates.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Returns updates with `id >= offset`, waiting up to `timeout_secs`
    /// server-side when none are pending. Acknowledges everything below
    /// `offset`.
    async fn get_updates(&self, offset: u32, timeout_secs: u32) -> Result<Vec<IncomingUpdate>>;
}

/// Outbound delivery to the destination chat.
///
/// Delivery is fire-and-forget: implementations log failures and never
/// report them to the caller.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish_media(&self, media_url: &str, caption: &str, media_type: MediaType);

    async fn publish_text(&self, text: &str);
}
