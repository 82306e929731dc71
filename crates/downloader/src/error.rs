use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloaderError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("qBittorrent API error: {status_code} - {message}")]
    Api { status_code: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Torrent rejected: {0}")]
    InvalidTorrent(String),

    #[error("Download did not finish within {0} seconds")]
    Timeout(u64),
}

pub type Result<T> = std::result::Result<T, DownloaderError>;
