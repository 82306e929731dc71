use std::path::Path;
use std::sync::Arc;

use composer::{AnimeRecord, BtEntry, MessageRef, release_caption};
use downloader::{AddTorrentOptions, DownloadedTorrent, Downloader};

use super::traits::{AnimeStore, Messenger, Result, SkipReason};
use crate::models::{ChatTarget, ReleaseDraft, TorrentStatus};

/// Outcome of publishing one release
#[derive(Debug, Clone, PartialEq)]
pub enum PublishOutcome {
    Sent(MessageRef),
    Skipped(SkipReason),
}

/// Where downloads go
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    pub save_path: Option<String>,
    pub category: Option<String>,
    /// Largest content published, in bytes
    pub max_size: u64,
}

/// Downloads a release and posts it as a video
pub struct ReleasePublisher {
    store: Arc<dyn AnimeStore>,
    messenger: Arc<dyn Messenger>,
    downloader: Arc<dyn Downloader>,
    options: DownloadOptions,
}

impl ReleasePublisher {
    pub fn new(
        store: Arc<dyn AnimeStore>,
        messenger: Arc<dyn Messenger>,
        downloader: Arc<dyn Downloader>,
        options: DownloadOptions,
    ) -> Self {
        Self {
            store,
            messenger,
            downloader,
            options,
        }
    }

    /// Download, check, send, then record the episode in the show's index.
    ///
    /// The downloaded torrent and its files are removed afterwards, whether
    /// the release was sent, skipped or failed.
    pub async fn publish(
        &self,
        anime: &AnimeRecord,
        draft: &ReleaseDraft,
        target: &ChatTarget,
    ) -> Result<PublishOutcome> {
        let mut options = AddTorrentOptions::new(&draft.magnet);
        if let Some(path) = &self.options.save_path {
            options = options.save_path(path);
        }
        if let Some(category) = &self.options.category {
            options = options.category(category);
        }

        let torrent = self.downloader.download(options).await?;
        let result = self.deliver(anime, draft, target, &torrent).await;

        if let Err(e) = self.downloader.remove(&torrent.handle, true).await {
            tracing::warn!(
                "[{}] Failed to remove torrent {}: {}",
                draft.team,
                torrent.handle,
                e
            );
        }
        result
    }

    async fn deliver(
        &self,
        anime: &AnimeRecord,
        draft: &ReleaseDraft,
        target: &ChatTarget,
        torrent: &DownloadedTorrent,
    ) -> Result<PublishOutcome> {
        if torrent.total_size > self.options.max_size {
            tracing::warn!(
                "[{}] '{}' is {} bytes, over the {} byte limit",
                draft.team,
                draft.title,
                torrent.total_size,
                self.options.max_size
            );
            return self
                .skip(draft, SkipReason::Oversize(torrent.total_size))
                .await;
        }

        match tokio::fs::metadata(&torrent.content_path).await {
            Ok(meta) if meta.is_dir() => {
                tracing::warn!(
                    "[{}] '{}' downloaded as a directory: {}",
                    draft.team,
                    draft.title,
                    torrent.content_path
                );
                return self
                    .skip(draft, SkipReason::Directory(torrent.content_path.clone()))
                    .await;
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(
                "[{}] Failed to stat {}: {}",
                draft.team,
                torrent.content_path,
                e
            ),
        }

        let caption = release_caption(anime, &draft.title, &draft.fansub, &draft.pub_date);
        let mut message = self
            .messenger
            .send_video(target, Path::new(&torrent.content_path), &caption)
            .await?;
        self.store
            .update_torrent_status(&draft.title, TorrentStatus::Sent)
            .await?;

        message.link = Some(self.messenger.message_link(&message).await?);
        let entry = BtEntry {
            episode: draft.episode_label(),
            message: Some(message.clone()),
            title: draft.title.clone(),
            source: draft.release.source.clone(),
            names: draft.release.names.clone(),
        };
        self.store
            .update_episode_index(anime.id, &draft.group_label(), entry)
            .await?;

        tracing::info!(
            "[{}] Published '{}' to {}",
            draft.team,
            draft.title,
            target.chat_id
        );
        Ok(PublishOutcome::Sent(message))
    }

    async fn skip(&self, draft: &ReleaseDraft, reason: SkipReason) -> Result<PublishOutcome> {
        self.store
            .update_torrent_status(&draft.title, TorrentStatus::Skipped)
            .await?;
        Ok(PublishOutcome::Skipped(reason))
    }
}
