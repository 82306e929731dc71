use serde::Deserialize;

/// Options for adding a torrent
#[derive(Debug, Clone, Default)]
pub struct AddTorrentOptions {
    /// Torrent URL or magnet link
    pub url: String,
    /// Save path / download directory
    pub save_path: Option<String>,
    /// Category (qBittorrent specific)
    pub category: Option<String>,
    /// Tags/labels
    pub tags: Vec<String>,
    /// Rename torrent (content name)
    pub rename: Option<String>,
}

impl AddTorrentOptions {
    /// Create new options with a URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the save path
    pub fn save_path(mut self, path: impl Into<String>) -> Self {
        self.save_path = Some(path.into());
        self
    }

    /// Set the category (qBittorrent)
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Add a single tag
    pub fn add_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set the rename (torrent content name)
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.rename = Some(name.into());
        self
    }
}

/// A finished download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedTorrent {
    /// Identifier to pass to [`crate::Downloader::remove`]
    pub handle: String,
    /// Total content size in bytes
    pub total_size: u64,
    /// Absolute path of the content: a file, or a directory for multi-file torrents
    pub content_path: String,
}

/// Torrent entry from /api/v2/torrents/info
#[derive(Debug, Clone, Deserialize)]
pub struct TorrentInfo {
    pub hash: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub total_size: i64,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub content_path: String,
    #[serde(default)]
    pub tags: String,
}

impl TorrentInfo {
    /// Whether all pieces are downloaded
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    /// Whether qBittorrent reports the torrent as failed
    pub fn is_errored(&self) -> bool {
        matches!(self.state.as_str(), "error" | "missingFiles")
    }
}
