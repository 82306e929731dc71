//! Collaborator contracts of the ingestion pipeline.
//!
//! Storage and messaging live outside this crate's core logic; the
//! pipeline only sees these traits so tests can substitute recorders.

use std::path::Path;

use async_trait::async_trait;
use composer::{AnimeRecord, BtEntry, ComposeError, MessageRef, TextMeasurer};
use downloader::DownloaderError;
use metadata::ProviderError;
use parser::ParseError;
use rss::FeedItem;

use crate::models::{ChatTarget, ReleaseDraft, TorrentStatus};

/// Error type for ingestion operations
#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("Store error: {0}")]
    Store(String),
    #[error("Messaging error: {0}")]
    Messaging(String),
    #[error("Metadata error: {0}")]
    Metadata(#[from] ProviderError),
    #[error("Downloader error: {0}")]
    Downloader(#[from] DownloaderError),
    #[error("Compose error: {0}")]
    Compose(#[from] ComposeError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IngestionError>;

/// Why an item was not published
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Title already recorded by an earlier pass
    KnownTitle,
    NoFansubGroup,
    UnsupportedKind(String),
    Unparsed(ParseError),
    /// No candidate name survived parsing
    Unnamed,
    /// Content larger than the configured limit, in bytes
    Oversize(u64),
    /// Multi-file torrent
    Directory(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::KnownTitle => write!(f, "already processed"),
            SkipReason::NoFansubGroup => write!(f, "no fansub group"),
            SkipReason::UnsupportedKind(kind) => write!(f, "unsupported feed type {}", kind),
            SkipReason::Unparsed(e) => write!(f, "unparsed: {}", e),
            SkipReason::Unnamed => write!(f, "no name extracted"),
            SkipReason::Oversize(size) => write!(f, "content too large ({} bytes)", size),
            SkipReason::Directory(path) => write!(f, "content is a directory ({})", path),
        }
    }
}

/// Result of processing one feed item
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Skipped(SkipReason),
    /// First release of an unknown show, sent for admin review
    Drafted { anime_id: Option<i64> },
    /// Release of a known show, published to the channel
    Published { anime_id: i64, episode: String },
}

/// Processes a single feed item end to end
#[async_trait]
pub trait ItemProcessor: Send + Sync + 'static {
    async fn process(&self, item: FeedItem) -> Result<ItemOutcome>;
}

/// Persistence of shows, seen torrents and drafts
#[async_trait]
pub trait AnimeStore: Send + Sync {
    /// Whether a torrent with this title was seen before and did not fail.
    async fn has_title(&self, title: &str) -> Result<bool>;

    /// Show whose known names intersect `names`.
    async fn find_release(&self, names: &[String]) -> Result<Option<AnimeRecord>>;

    async fn get_anime(&self, id: i64) -> Result<Option<AnimeRecord>>;

    async fn save_draft(&self, draft: &ReleaseDraft) -> Result<()>;

    /// Record a torrent. An earlier record of the title is kept unless it failed.
    async fn add_torrent(&self, title: &str, magnet: &str, status: TorrentStatus) -> Result<()>;

    async fn torrent_status(&self, title: &str) -> Result<Option<TorrentStatus>>;

    async fn update_torrent_status(&self, title: &str, status: TorrentStatus) -> Result<()>;

    /// Insert or replace a show.
    async fn save_anime(&self, anime: &AnimeRecord) -> Result<()>;

    /// Insert `entry` into `group`'s episode list of the show.
    async fn update_episode_index(&self, anime_id: i64, group: &str, entry: BtEntry) -> Result<()>;

    async fn update_score(&self, anime_id: i64, score: f64) -> Result<()>;

    async fn set_nav_message(&self, anime_id: i64, message: MessageRef) -> Result<()>;

    async fn record_nav_page(&self, anime_id: i64, page: usize, message: MessageRef) -> Result<()>;

    /// Show tags that are never rendered.
    async fn tag_exclude_list(&self) -> Result<Vec<String>>;
}

/// Messaging surface. Texts are markdown as produced by `composer`.
#[async_trait]
pub trait Messenger: TextMeasurer {
    async fn send_text(
        &self,
        target: &ChatTarget,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<MessageRef>;

    async fn send_photo(&self, target: &ChatTarget, photo_url: &str, caption: &str)
        -> Result<MessageRef>;

    async fn send_video(&self, target: &ChatTarget, path: &Path, caption: &str)
        -> Result<MessageRef>;

    async fn edit_text(&self, message: &MessageRef, text: &str) -> Result<()>;

    async fn edit_caption(&self, message: &MessageRef, caption: &str) -> Result<()>;

    /// Public link to a sent message.
    async fn message_link(&self, message: &MessageRef) -> Result<String>;
}
