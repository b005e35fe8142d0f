use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::RedditConfig;
use crate::platform::MediaType;

/// Host prepended to listing permalinks.
pub const PERMALINK_HOST: &str = "https://www.reddit.com";

const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".gif"];

#[derive(Debug, Error)]
pub enum RedditError {
    #[error("Failed to fetch {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },
    #[error("Invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
    #[error("Unexpected response from {url}: {reason}")]
    Malformed { url: String, reason: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub url: String,
    pub media_type: MediaType,
}

/// One submission, reduced to what gets republished.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostInfo {
    pub title: String,
    pub selftext: String,
    pub media: Option<Media>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestItem {
    pub title: String,
    pub url: String,
}

/// Where posts and top listings come from.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_post(&self, url: &str) -> Result<PostInfo, RedditError>;

    /// At most `limit` of today's top posts in `subreddit`, in listing order.
    async fn fetch_top(&self, subreddit: &str, limit: u32)
        -> Result<Vec<DigestItem>, RedditError>;
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: RawPost,
}

#[derive(Debug, Deserialize)]
struct RawPost {
    title: Option<String>,
    selftext: Option<String>,
    permalink: Option<String>,
    is_video: Option<bool>,
    secure_media: Option<SecureMedia>,
    url_overridden_by_dest: Option<String>,
    preview: Option<Preview>,
}

#[derive(Debug, Deserialize)]
struct SecureMedia {
    reddit_video: Option<RedditVideo>,
}

#[derive(Debug, Deserialize)]
struct RedditVideo {
    fallback_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Preview {
    #[serde(default)]
    images: Vec<PreviewImage>,
}

#[derive(Debug, Deserialize)]
struct PreviewImage {
    source: Option<ImageSource>,
}

#[derive(Debug, Deserialize)]
struct ImageSource {
    url: Option<String>,
}

/// First match wins: hosted video, then a direct image link, then the
/// first preview image.
fn extract_media(post: &RawPost) -> Option<Media> {
    if post.is_video.unwrap_or(false) {
        let fallback = post
            .secure_media
            .as_ref()
            .and_then(|m| m.reddit_video.as_ref())
            .and_then(|v| v.fallback_url.as_deref())
            .filter(|url| !url.is_empty());
        if let Some(url) = fallback {
            return Some(Media {
                url: url.to_string(),
                media_type: MediaType::Video,
            });
        }
        // No playable fallback: fall through to the image rules rather than
        // giving up (see "Rule 1 without a fallback URL" in DESIGN.md).
    }

    if let Some(url) = post
        .url_overridden_by_dest
        .as_deref()
        .filter(|url| is_image_url(url))
    {
        return Some(Media {
            url: url.to_string(),
            media_type: MediaType::Photo,
        });
    }

    post.preview
        .as_ref()
        .and_then(|p| p.images.first())
        .and_then(|img| img.source.as_ref())
        .and_then(|src| src.url.as_deref())
        .filter(|url| !url.is_empty())
        .map(|url| Media {
            // preview urls arrive HTML-escaped
            url: url.replace("&amp;", "&"),
            media_type: MediaType::Photo,
        })
}

fn is_image_url(url: &str) -> bool {
    let path = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.path().to_ascii_lowercase(),
        Err(_) => return false,
    };
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

impl From<RawPost> for PostInfo {
    fn from(post: RawPost) -> Self {
        let media = extract_media(&post);
        Self {
            title: post.title.unwrap_or_default(),
            selftext: post.selftext.unwrap_or_default(),
            media,
        }
    }
}

impl From<RawPost> for DigestItem {
    fn from(post: RawPost) -> Self {
        Self {
            title: post.title.unwrap_or_default(),
            url: format!("{}{}", PERMALINK_HOST, post.permalink.unwrap_or_default()),
        }
    }
}

/// Submission URL → its JSON document URL.
pub fn post_json_url(url: &str) -> String {
    format!("{}.json", url.trim_end_matches('/'))
}

pub struct RedditClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl RedditClient {
    pub fn new(config: &RedditConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
        }
    }

    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, RedditError> {
        debug!("Fetching {}", url);

        let fetch_err = |source| RedditError::Fetch {
            url: url.to_string(),
            source,
        };

        let body = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .query(query)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(fetch_err)?
            .bytes()
            .await
            .map_err(fetch_err)?;

        serde_json::from_slice(&body).map_err(|source| RedditError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl ContentSource for RedditClient {
    async fn fetch_post(&self, url: &str) -> Result<PostInfo, RedditError> {
        let api_url = post_json_url(url);
        let document = self.get_json(&api_url, &[]).await?;

        let malformed = |reason| RedditError::Malformed {
            url: api_url.clone(),
            reason,
        };

        let listings: Vec<Listing> =
            serde_json::from_value(document).map_err(|_| malformed("expected a listing array"))?;
        let post = listings
            .into_iter()
            .next()
            .ok_or_else(|| malformed("empty listing array"))?
            .data
            .children
            .into_iter()
            .next()
            .ok_or_else(|| malformed("listing has no posts"))?
            .data;

        Ok(PostInfo::from(post))
    }

    async fn fetch_top(
        &self,
        subreddit: &str,
        limit: u32,
    ) -> Result<Vec<DigestItem>, RedditError> {
        let url = format!("{}/r/{}/top.json", self.base_url, subreddit);
        let query = [("t", "day".to_string()), ("limit", limit.to_string())];
        let document = self.get_json(&url, &query).await?;

        let listing: Listing =
            serde_json::from_value(document).map_err(|_| RedditError::Malformed {
                url: url.clone(),
                reason: "expected a listing object",
            })?;

        let cap = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(listing
            .data
            .children
            .into_iter()
            .take(cap)
            .map(|child| DigestItem::from(child.data))
            .collect())
    }
}
