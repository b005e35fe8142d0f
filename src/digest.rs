use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::platform::Publisher;
use crate::reddit::{ContentSource, DigestItem};
use crate::translate::Translator;

/// Broadcasts a subreddit's top posts of the day to the destination chat.
pub struct Digest {
    source: Arc<dyn ContentSource>,
    publisher: Arc<dyn Publisher>,
    translator: Arc<dyn Translator>,
    subreddit: String,
    limit: u32,
}

impl Digest {
    pub fn new(
        source: Arc<dyn ContentSource>,
        publisher: Arc<dyn Publisher>,
        translator: Arc<dyn Translator>,
        subreddit: String,
        limit: u32,
    ) -> Self {
        Self {
            source,
            publisher,
            translator,
            subreddit,
            limit,
        }
    }

    pub fn format_item(&self, item: &DigestItem) -> String {
        format!("{}\n{}", self.translator.translate(&item.title), item.url)
    }

    /// Fetch and publish one batch. Returns the number of posts sent.
    pub async fn run_once(&self) -> Result<usize> {
        let items = self
            .source
            .fetch_top(&self.subreddit, self.limit)
            .await
            .with_context(|| format!("Failed to fetch top posts of r/{}", self.subreddit))?;

        info!("Publishing {} post(s) from r/{}", items.len(), self.subreddit);

        for item in &items {
            self.publisher.publish_text(&self.format_item(item)).await;
        }

        Ok(items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CannedSource, Published, RecordingPublisher};
    use crate::translate::StubTranslator;

    fn item(n: u32) -> DigestItem {
        DigestItem {
            title: format!("post {n}"),
            url: format!("https://www.reddit.com/r/aww/comments/{n}/"),
        }
    }

    fn digest(source: Arc<CannedSource>, publisher: Arc<RecordingPublisher>, limit: u32) -> Digest {
        Digest::new(
            source,
            publisher,
            Arc::new(StubTranslator),
            "aww".to_string(),
            limit,
        )
    }

    #[test]
    fn test_format_item() {
        let digest = digest(
            Arc::new(CannedSource::default()),
            Arc::new(RecordingPublisher::default()),
            5,
        );
        assert_eq!(
            digest.format_item(&item(1)),
            "Перевод: post 1\nhttps://www.reddit.com/r/aww/comments/1/"
        );
    }

    #[tokio::test]
    async fn test_publishes_each_item_in_order() {
        let source = Arc::new(CannedSource {
            top: vec![item(1), item(2), item(3)],
            ..CannedSource::default()
        });
        let publisher = Arc::new(RecordingPublisher::default());
        let digest = digest(source.clone(), publisher.clone(), 2);

        assert_eq!(digest.run_once().await.unwrap(), 2);
        assert_eq!(source.requested(), vec!["r/aww/top?limit=2"]);
        assert_eq!(
            publisher.sent(),
            vec![
                Published::Text(digest.format_item(&item(1))),
                Published::Text(digest.format_item(&item(2))),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_listing_publishes_nothing() {
        let publisher = Arc::new(RecordingPublisher::default());
        let digest = digest(Arc::new(CannedSource::default()), publisher.clone(), 5);

        assert_eq!(digest.run_once().await.unwrap(), 0);
        assert!(publisher.sent().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_returned() {
        let publisher = Arc::new(RecordingPublisher::default());
        let digest = digest(Arc::new(CannedSource::failing()), publisher.clone(), 5);

        let err = digest.run_once().await.unwrap_err();
        assert!(err.to_string().contains("r/aww"));
        assert!(publisher.sent().is_empty());
    }
}
