use serde::Deserialize;
use std::time::Duration;

/// Downloader type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloaderType {
    #[default]
    QBittorrent,
}

/// Configuration for creating a downloader client
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Downloader type
    pub downloader_type: DownloaderType,
    /// API URL
    pub url: String,
    /// Username (qBittorrent)
    pub username: Option<String>,
    /// Password (qBittorrent)
    pub password: Option<String>,
    /// Interval between completion checks
    pub poll_interval: Duration,
    /// Give up waiting for a download after this long
    pub max_wait: Duration,
}

impl DownloaderConfig {
    /// Create config for qBittorrent
    pub fn qbittorrent(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            downloader_type: DownloaderType::QBittorrent,
            url: url.into(),
            username: Some(username.into()),
            password: Some(password.into()),
            poll_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(30 * 60),
        }
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }
}
