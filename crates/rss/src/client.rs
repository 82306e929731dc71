use std::collections::HashSet;

use async_trait::async_trait;
use futures::future::join_all;
use parser::TitleFilter;
use reqwest::Client;

use crate::error::RssError;
use crate::models::{FeedItem, FeedKind, FeedUrl};
use crate::parsers::{parse_bangumi_moe_feed, parse_torrent_feed};

/// Source of feed items for one poll
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch, filter and merge all feeds.
    async fn fetch_items(&self) -> crate::Result<Vec<FeedItem>>;
}

/// RSS feed fetcher client
pub struct RssClient {
    client: Client,
    feeds: Vec<FeedUrl>,
    filter: TitleFilter,
}

impl RssClient {
    /// Create a new RssClient with a static reqwest Client
    pub fn with_client(client: Client, feeds: Vec<FeedUrl>) -> Self {
        Self {
            client,
            feeds,
            filter: TitleFilter::new(),
        }
    }

    pub fn feeds(&self) -> &[FeedUrl] {
        &self.feeds
    }

    /// Fetch and parse a single feed
    ///
    /// # Example
    /// ```no_run
    /// use rss::{FeedUrl, RssClient};
    ///
    /// # async fn example() -> rss::Result<()> {
    /// let client = RssClient::with_client(reqwest::Client::new(), vec![]);
    /// let items = client.fetch(&FeedUrl::bangumi_moe()).await?;
    ///
    /// for item in items {
    ///     println!("{}", item.title);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch(&self, feed: &FeedUrl) -> crate::Result<Vec<FeedItem>> {
        tracing::debug!("Fetching RSS feed from: {}", feed.url);

        let response = self.client.get(&feed.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(RssError::Status {
                status: status.as_u16(),
                url: feed.url.clone(),
            });
        }

        let bytes = response.bytes().await?;

        let items = match &feed.kind {
            FeedKind::Bangumi => parse_bangumi_moe_feed(&bytes)?,
            kind => parse_torrent_feed(&bytes, kind.clone())?,
        };

        let total = items.len();
        let items: Vec<FeedItem> = items
            .into_iter()
            .filter(|item| self.filter.allow(&item.title))
            .collect();

        tracing::debug!(
            "Parsed {} items from {} ({} passed the title filter)",
            total,
            feed.url,
            items.len()
        );
        Ok(items)
    }
}

#[async_trait]
impl FeedSource for RssClient {
    /// Fetch all feeds concurrently. A failing feed is logged and skipped;
    /// the poll only fails when every feed fails.
    async fn fetch_items(&self) -> crate::Result<Vec<FeedItem>> {
        let results = join_all(self.feeds.iter().map(|feed| self.fetch(feed))).await;

        let mut batches = Vec::with_capacity(results.len());
        let mut last_error = None;
        for (feed, result) in self.feeds.iter().zip(results) {
            match result {
                Ok(items) => batches.push(items),
                Err(e) => {
                    tracing::warn!("[{}] Failed to fetch feed {}: {}", feed.kind, feed.url, e);
                    last_error = Some(e);
                }
            }
        }

        if batches.is_empty() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        Ok(merge_items(batches))
    }
}

/// Merge feeds in order, keeping the first item for each title.
pub(crate) fn merge_items(batches: Vec<Vec<FeedItem>>) -> Vec<FeedItem> {
    let mut seen = HashSet::new();
    batches
        .into_iter()
        .flatten()
        .filter(|item| !item.title.is_empty() && !item.pub_date.is_empty())
        .filter(|item| seen.insert(item.title.clone()))
        .collect()
}
