//! In-memory stand-ins for the Reddit and Telegram seams.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::platform::{IncomingUpdate, MediaType, Publisher, UpdateSource};
use crate::reddit::{ContentSource, DigestItem, PostInfo, RedditError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Published {
    Media {
        url: String,
        caption: String,
        media_type: MediaType,
    },
    Text(String),
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub sent: Mutex<Vec<Published>>,
}

impl RecordingPublisher {
    pub fn sent(&self) -> Vec<Published> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish_media(&self, media_url: &str, caption: &str, media_type: MediaType) {
        self.sent.lock().unwrap().push(Published::Media {
            url: media_url.to_string(),
            caption: caption.to_string(),
            media_type,
        });
    }

    async fn publish_text(&self, text: &str) {
        self.sent
            .lock()
            .unwrap()
            .push(Published::Text(text.to_string()));
    }
}

/// Serves one canned post for every link and a canned top listing.
#[derive(Default)]
pub struct CannedSource {
    pub post: PostInfo,
    pub top: Vec<DigestItem>,
    pub fail: bool,
    pub requested: Mutex<Vec<String>>,
}

impl CannedSource {
    pub fn with_post(post: PostInfo) -> Self {
        Self {
            post,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }

    fn check(&self, url: String) -> Result<(), RedditError> {
        self.requested.lock().unwrap().push(url.clone());
        if self.fail {
            return Err(RedditError::Malformed {
                url,
                reason: "canned failure",
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContentSource for CannedSource {
    async fn fetch_post(&self, url: &str) -> Result<PostInfo, RedditError> {
        self.check(url.to_string())?;
        Ok(self.post.clone())
    }

    async fn fetch_top(
        &self,
        subreddit: &str,
        limit: u32,
    ) -> Result<Vec<DigestItem>, RedditError> {
        self.check(format!("r/{subreddit}/top?limit={limit}"))?;
        Ok(self.top.iter().take(limit as usize).cloned().collect())
    }
}

/// Hands out queued batches; an empty queue yields empty batches.
#[derive(Default)]
pub struct ScriptedUpdates {
    pub batches: Mutex<VecDeque<Vec<IncomingUpdate>>>,
    pub offsets: Mutex<Vec<u32>>,
}

impl ScriptedUpdates {
    pub fn new(batches: Vec<Vec<IncomingUpdate>>) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            offsets: Mutex::new(Vec::new()),
        }
    }

    pub fn offsets(&self) -> Vec<u32> {
        self.offsets.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpdateSource for ScriptedUpdates {
    async fn get_updates(&self, offset: u32, _timeout_secs: u32) -> Result<Vec<IncomingUpdate>> {
        self.offsets.lock().unwrap().push(offset);
        Ok(self.batches.lock().unwrap().pop_front().unwrap_or_default())
    }
}

pub fn text_update(id: u32, text: &str) -> IncomingUpdate {
    IncomingUpdate {
        id,
        text: Some(text.to_string()),
    }
}
