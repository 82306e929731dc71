//! JSON file backed [`AnimeStore`]
//!
//! The whole document is kept in memory and rewritten after every change
//! (temp file, then rename).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use composer::{AnimeRecord, BtEntry, MessageRef};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::ingestion::{AnimeStore, IngestionError, Result};
use crate::models::{ReleaseDraft, TorrentRecord, TorrentStatus};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoreData {
    animes: BTreeMap<i64, AnimeRecord>,
    torrents: Vec<TorrentRecord>,
    drafts: Vec<ReleaseDraft>,
    /// Show tags never rendered in captions
    excluded_tags: Vec<String>,
}

pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl JsonFileStore {
    /// Open the store at `path`, starting empty when the file is missing.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                IngestionError::Store(format!("invalid store file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("Starting with an empty store at {}", path.display());
                StoreData::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, data: &StoreData) -> Result<()> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| IngestionError::Store(format!("failed to serialize store: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    /// Apply `change` to a show and persist. Missing shows are an error.
    async fn update_anime<F>(&self, anime_id: i64, change: F) -> Result<()>
    where
        F: FnOnce(&mut AnimeRecord),
    {
        let mut data = self.data.lock().await;
        let anime = data
            .animes
            .get_mut(&anime_id)
            .ok_or_else(|| IngestionError::Store(format!("anime {} not found", anime_id)))?;
        change(anime);
        self.persist(&data).await
    }
}

#[async_trait]
impl AnimeStore for JsonFileStore {
    async fn has_title(&self, title: &str) -> Result<bool> {
        let data = self.data.lock().await;
        Ok(data
            .torrents
            .iter()
            .any(|t| t.title == title && t.status != TorrentStatus::Failed))
    }

    async fn find_release(&self, names: &[String]) -> Result<Option<AnimeRecord>> {
        let data = self.data.lock().await;
        Ok(data
            .animes
            .values()
            .find(|anime| anime.names.iter().any(|n| names.contains(n)))
            .cloned())
    }

    async fn get_anime(&self, id: i64) -> Result<Option<AnimeRecord>> {
        Ok(self.data.lock().await.animes.get(&id).cloned())
    }

    async fn save_draft(&self, draft: &ReleaseDraft) -> Result<()> {
        let mut data = self.data.lock().await;
        data.drafts.retain(|d| d.title != draft.title);
        data.drafts.push(draft.clone());
        self.persist(&data).await
    }

    async fn add_torrent(&self, title: &str, magnet: &str, status: TorrentStatus) -> Result<()> {
        let mut data = self.data.lock().await;
        match data.torrents.iter_mut().find(|t| t.title == title) {
            Some(torrent) if torrent.status == TorrentStatus::Failed => {
                torrent.magnet = magnet.to_string();
                torrent.status = status;
            }
            Some(_) => return Ok(()),
            None => data.torrents.push(TorrentRecord {
                title: title.to_string(),
                magnet: magnet.to_string(),
                status,
            }),
        }
        self.persist(&data).await
    }

    async fn torrent_status(&self, title: &str) -> Result<Option<TorrentStatus>> {
        let data = self.data.lock().await;
        Ok(data
            .torrents
            .iter()
            .find(|t| t.title == title)
            .map(|t| t.status))
    }

    async fn update_torrent_status(&self, title: &str, status: TorrentStatus) -> Result<()> {
        let mut data = self.data.lock().await;
        match data.torrents.iter_mut().find(|t| t.title == title) {
            Some(torrent) => torrent.status = status,
            None => {
                tracing::warn!("[store] Torrent '{}' not recorded, cannot mark {}", title, status);
                return Ok(());
            }
        }
        self.persist(&data).await
    }

    async fn save_anime(&self, anime: &AnimeRecord) -> Result<()> {
        let mut data = self.data.lock().await;
        data.animes.insert(anime.id, anime.clone());
        self.persist(&data).await
    }

    async fn update_episode_index(&self, anime_id: i64, group: &str, entry: BtEntry) -> Result<()> {
        self.update_anime(anime_id, |anime| anime.upsert_entry(group, entry))
            .await
    }

    async fn update_score(&self, anime_id: i64, score: f64) -> Result<()> {
        self.update_anime(anime_id, |anime| anime.score = Some(score))
            .await
    }

    async fn set_nav_message(&self, anime_id: i64, message: MessageRef) -> Result<()> {
        self.update_anime(anime_id, |anime| anime.nav_message = Some(message))
            .await
    }

    async fn record_nav_page(&self, anime_id: i64, page: usize, message: MessageRef) -> Result<()> {
        self.update_anime(anime_id, |anime| {
            anime.nav_pages.insert(page, message);
        })
        .await
    }

    async fn tag_exclude_list(&self) -> Result<Vec<String>> {
        Ok(self.data.lock().await.excluded_tags.clone())
    }
}
