mod client;
mod config;
mod error;
mod models;
mod qbittorrent;
mod traits;

pub use client::DownloaderClient;
pub use config::{DownloaderConfig, DownloaderType};
pub use error::DownloaderError;
pub use models::{AddTorrentOptions, DownloadedTorrent, TorrentInfo};
pub use qbittorrent::QBittorrentDownloader;
pub use traits::Downloader;

/// Result type alias for downloader operations
pub type Result<T> = std::result::Result<T, DownloaderError>;
