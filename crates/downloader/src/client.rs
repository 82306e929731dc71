use async_trait::async_trait;

use crate::config::{DownloaderConfig, DownloaderType};
use crate::error::{DownloaderError, Result};
use crate::models::{AddTorrentOptions, DownloadedTorrent};
use crate::qbittorrent::QBittorrentDownloader;
use crate::traits::Downloader;

/// Unified downloader client (enum dispatch)
pub enum DownloaderClient {
    QBittorrent(QBittorrentDownloader),
}

impl DownloaderClient {
    /// Create a downloader client from configuration
    pub fn from_config(config: DownloaderConfig) -> Result<Self> {
        match config.downloader_type {
            DownloaderType::QBittorrent => {
                let username = config.username.ok_or_else(|| {
                    DownloaderError::Config("qBittorrent requires username".into())
                })?;
                let password = config.password.ok_or_else(|| {
                    DownloaderError::Config("qBittorrent requires password".into())
                })?;
                if config.url.trim().is_empty() {
                    return Err(DownloaderError::Config("qBittorrent requires a URL".into()));
                }

                let downloader = QBittorrentDownloader::new(config.url, username, password)
                    .with_timing(config.poll_interval, config.max_wait);
                Ok(Self::QBittorrent(downloader))
            }
        }
    }
}

/// Implement Downloader trait for DownloaderClient (dispatch to concrete implementations)
#[async_trait]
impl Downloader for DownloaderClient {
    async fn download(&self, options: AddTorrentOptions) -> Result<DownloadedTorrent> {
        match self {
            Self::QBittorrent(d) => d.download(options).await,
        }
    }

    async fn remove(&self, handle: &str, delete_files: bool) -> Result<()> {
        match self {
            Self::QBittorrent(d) => d.remove(handle, delete_files).await,
        }
    }

    fn downloader_type(&self) -> &'static str {
        match self {
            Self::QBittorrent(d) => d.downloader_type(),
        }
    }
}
