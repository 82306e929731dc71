use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AddTorrentOptions, DownloadedTorrent};

/// Torrent client used to fetch a release before it is published
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Add a torrent and wait until its content is on disk.
    async fn download(&self, options: AddTorrentOptions) -> Result<DownloadedTorrent>;

    /// Remove a torrent, optionally deleting its files.
    ///
    /// # Arguments
    /// * `handle` - Handle returned in [`DownloadedTorrent::handle`]
    /// * `delete_files` - Whether to delete downloaded files
    async fn remove(&self, handle: &str, delete_files: bool) -> Result<()>;

    /// Get the downloader type name (for logging)
    fn downloader_type(&self) -> &'static str;
}
