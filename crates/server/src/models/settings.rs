use std::time::Duration;

use composer::ComposerBudgets;
use downloader::DownloaderConfig;
use rss::{FeedKind, FeedUrl};
use serde::{Deserialize, Serialize};

/// Application settings stored in TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Messaging surface configuration
    #[serde(default)]
    pub telegram: TelegramSettings,
    /// Downloader configuration
    #[serde(default)]
    pub downloader: DownloaderSettings,
    /// Watched feeds
    #[serde(default)]
    pub feeds: FeedSettings,
    /// Ingestion pipeline limits
    #[serde(default)]
    pub pipeline: PipelineSettings,
    /// Message size budgets
    #[serde(default)]
    pub composer: ComposerBudgets,
}

/// Telegram bot and chat configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    pub bot_token: String,
    /// Bot API endpoint
    pub api_url: String,
    /// Admin group for review, prompts and errors
    pub admin_chat_id: i64,
    pub review_thread_id: Option<i64>,
    pub error_thread_id: Option<i64>,
    /// Channel receiving release announcements
    pub release_channel_id: i64,
    /// Channel holding the per-show navigation cards
    pub nav_channel_id: i64,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_url: "https://api.telegram.org".to_string(),
            admin_chat_id: 0,
            review_thread_id: None,
            error_thread_id: None,
            release_channel_id: 0,
            nav_channel_id: 0,
        }
    }
}

/// Downloader (qBittorrent) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloaderSettings {
    /// qBittorrent Web UI URL (e.g., http://localhost:8080)
    pub url: String,
    pub username: String,
    pub password: String,
    pub save_path: Option<String>,
    pub category: Option<String>,
    /// Seconds between completion checks
    pub poll_interval_secs: u64,
}

impl Default for DownloaderSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            username: "admin".to_string(),
            password: String::new(),
            save_path: None,
            category: None,
            poll_interval_secs: 5,
        }
    }
}

impl DownloaderSettings {
    /// Downloader config waiting at most `max_wait` for a download.
    pub fn to_config(&self, max_wait: Duration) -> DownloaderConfig {
        DownloaderConfig::qbittorrent(&self.url, &self.username, &self.password)
            .poll_interval(Duration::from_secs(self.poll_interval_secs))
            .max_wait(max_wait)
    }
}

/// Feed URLs per site
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub bangumi: Vec<String>,
    pub dmhy: Vec<String>,
    pub acgnx: Vec<String>,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            bangumi: vec![FeedUrl::bangumi_moe().url],
            dmhy: vec!["https://share.dmhy.org/topics/rss/rss.xml".to_string()],
            acgnx: vec!["https://share.acgnx.se/rss.xml".to_string()],
        }
    }
}

impl FeedSettings {
    /// All feeds in polling order.
    pub fn urls(&self) -> Vec<FeedUrl> {
        let bangumi = self.bangumi.iter().map(|u| FeedUrl::new(FeedKind::Bangumi, u));
        let dmhy = self.dmhy.iter().map(|u| FeedUrl::new(FeedKind::Dmhy, u));
        let acgnx = self.acgnx.iter().map(|u| FeedUrl::new(FeedKind::Acgnx, u));
        bangumi.chain(dmhy).chain(acgnx).collect()
    }
}

/// Ingestion pipeline limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Items processed at the same time
    pub concurrency: usize,
    /// Seconds before a stuck item is left to finish in the background
    pub item_timeout_secs: u64,
    /// Largest torrent that is published, in bytes
    pub max_torrent_size: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            concurrency: 3,
            item_timeout_secs: 30 * 60,
            max_torrent_size: 2 * 1024 * 1024 * 1024,
        }
    }
}

impl PipelineSettings {
    pub fn item_timeout(&self) -> Duration {
        Duration::from_secs(self.item_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_roundtrip_through_toml() {
        let settings = Settings::default();
        let text = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&text).unwrap();

        assert_eq!(parsed.pipeline.concurrency, 3);
        assert_eq!(parsed.pipeline.item_timeout(), Duration::from_secs(1800));
        assert_eq!(parsed.pipeline.max_torrent_size, 2_147_483_648);
        assert_eq!(parsed.composer, ComposerBudgets::default());
        assert_eq!(parsed.feeds.urls().len(), 3);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: Settings = toml::from_str(
            r#"
            [telegram]
            bot_token = "123:abc"
            admin_chat_id = -1001

            [pipeline]
            concurrency = 5
            "#,
        )
        .unwrap();

        assert_eq!(parsed.telegram.bot_token, "123:abc");
        assert_eq!(parsed.telegram.api_url, "https://api.telegram.org");
        assert_eq!(parsed.pipeline.concurrency, 5);
        assert_eq!(parsed.pipeline.item_timeout_secs, 1800);
        assert_eq!(parsed.composer.card.max_chars, 1024);
    }

    #[test]
    fn test_feed_urls_keep_kind() {
        let feeds = FeedSettings {
            bangumi: vec![],
            dmhy: vec!["https://dmhy.example/rss".into()],
            acgnx: vec![],
        };
        assert_eq!(
            feeds.urls(),
            vec![FeedUrl::new(FeedKind::Dmhy, "https://dmhy.example/rss")]
        );
    }
}
