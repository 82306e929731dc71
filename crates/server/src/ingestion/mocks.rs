//! Mock implementations for testing the ingestion pipeline.
//!
//! Every mock is cheap to clone and shares its state, so a test keeps one
//! handle for verification and passes another into the component.
//!
//! # Example
//!
//! ```ignore
//! use crate::ingestion::mocks::*;
//!
//! #[tokio::test]
//! async fn test_publish() {
//!     let store = MockStore::new();
//!     store.insert_anime(test_anime(1));
//!
//!     let downloader = MockDownloader::new();
//!     downloader.set_size(3 * 1024 * 1024 * 1024);
//!
//!     // Build the component with Arc::new(store.clone()), ...
//!     // then assert on store.get_torrents(), downloader.get_removed(), ...
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use composer::{
    AnimeRecord, BtEntry, MarkdownMeasurer, Measurement, MessageRef, TextMeasurer,
};
use downloader::{AddTorrentOptions, DownloadedTorrent, Downloader, DownloaderError};
use metadata::{
    EpisodesResponse, MetadataProvider, ProviderError, SubjectDetail, Tag, Team, TorrentDetail,
};
use parser::{EpisodeToken, ParsedRelease, ReleaseEpisode};
use rss::FeedKind;

use super::traits::*;
use crate::models::{ChatTarget, ReleaseDraft, TorrentRecord, TorrentStatus};

// ============================================================================
// Fixtures
// ============================================================================

pub fn test_anime(id: i64) -> AnimeRecord {
    AnimeRecord {
        id,
        name: "Sousou no Frieren".into(),
        name_cn: "葬送的芙莉莲".into(),
        names: vec!["葬送的芙莉莲".into(), "Sousou no Frieren".into()],
        airing_start: Some("2023年9月29日".into()),
        ..Default::default()
    }
}

pub fn test_draft(team: &str, episode: &str) -> ReleaseDraft {
    ReleaseDraft {
        title: format!("[{}] 葬送的芙莉莲 - {} [1080P]", team, episode),
        pub_date: "2023年09月29日 11:00PM".into(),
        kind: FeedKind::Dmhy,
        magnet: format!("magnet:?xt=urn:btih:{}{}", team, episode),
        team: team.into(),
        fansub: vec![team.into()],
        release: ParsedRelease {
            groups: vec![team.into()],
            names: vec!["葬送的芙莉莲".into()],
            source: String::new(),
            episode: ReleaseEpisode::Single(EpisodeToken::parse(episode)),
        },
    }
}

// ============================================================================
// Mock Store
// ============================================================================

#[derive(Default)]
struct StoreState {
    animes: HashMap<i64, AnimeRecord>,
    torrents: Vec<TorrentRecord>,
    drafts: Vec<ReleaseDraft>,
    excluded_tags: Vec<String>,
}

/// In-memory AnimeStore
#[derive(Clone, Default)]
pub struct MockStore {
    state: Arc<Mutex<StoreState>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_anime(&self, anime: AnimeRecord) {
        self.state.lock().unwrap().animes.insert(anime.id, anime);
    }

    pub fn set_excluded_tags(&self, tags: &[&str]) {
        self.state.lock().unwrap().excluded_tags = tags.iter().map(|t| t.to_string()).collect();
    }

    pub fn get_anime_sync(&self, id: i64) -> Option<AnimeRecord> {
        self.state.lock().unwrap().animes.get(&id).cloned()
    }

    pub fn get_torrents(&self) -> Vec<TorrentRecord> {
        self.state.lock().unwrap().torrents.clone()
    }

    pub fn get_drafts(&self) -> Vec<ReleaseDraft> {
        self.state.lock().unwrap().drafts.clone()
    }
}

#[async_trait]
impl AnimeStore for MockStore {
    async fn has_title(&self, title: &str) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .torrents
            .iter()
            .any(|t| t.title == title && t.status != TorrentStatus::Failed))
    }

    async fn find_release(&self, names: &[String]) -> Result<Option<AnimeRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .animes
            .values()
            .find(|a| a.names.iter().any(|n| names.contains(n)))
            .cloned())
    }

    async fn get_anime(&self, id: i64) -> Result<Option<AnimeRecord>> {
        Ok(self.get_anime_sync(id))
    }

    async fn save_draft(&self, draft: &ReleaseDraft) -> Result<()> {
        self.state.lock().unwrap().drafts.push(draft.clone());
        Ok(())
    }

    async fn add_torrent(&self, title: &str, magnet: &str, status: TorrentStatus) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.torrents.iter_mut().find(|t| t.title == title) {
            Some(t) if t.status == TorrentStatus::Failed => t.status = status,
            Some(_) => {}
            None => state.torrents.push(TorrentRecord {
                title: title.into(),
                magnet: magnet.into(),
                status,
            }),
        }
        Ok(())
    }

    async fn torrent_status(&self, title: &str) -> Result<Option<TorrentStatus>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .torrents
            .iter()
            .find(|t| t.title == title)
            .map(|t| t.status))
    }

    async fn update_torrent_status(&self, title: &str, status: TorrentStatus) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(t) = state.torrents.iter_mut().find(|t| t.title == title) {
            t.status = status;
        }
        Ok(())
    }

    async fn save_anime(&self, anime: &AnimeRecord) -> Result<()> {
        self.insert_anime(anime.clone());
        Ok(())
    }

    async fn update_episode_index(&self, anime_id: i64, group: &str, entry: BtEntry) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let anime = state
            .animes
            .get_mut(&anime_id)
            .ok_or_else(|| IngestionError::Store(format!("anime {} not found", anime_id)))?;
        anime.upsert_entry(group, entry);
        Ok(())
    }

    async fn update_score(&self, anime_id: i64, score: f64) -> Result<()> {
        if let Some(anime) = self.state.lock().unwrap().animes.get_mut(&anime_id) {
            anime.score = Some(score);
        }
        Ok(())
    }

    async fn set_nav_message(&self, anime_id: i64, message: MessageRef) -> Result<()> {
        if let Some(anime) = self.state.lock().unwrap().animes.get_mut(&anime_id) {
            anime.nav_message = Some(message);
        }
        Ok(())
    }

    async fn record_nav_page(&self, anime_id: i64, page: usize, message: MessageRef) -> Result<()> {
        if let Some(anime) = self.state.lock().unwrap().animes.get_mut(&anime_id) {
            anime.nav_pages.insert(page, message);
        }
        Ok(())
    }

    async fn tag_exclude_list(&self) -> Result<Vec<String>> {
        Ok(self.state.lock().unwrap().excluded_tags.clone())
    }
}

// ============================================================================
// Mock Messenger
// ============================================================================

/// Recorded outgoing message
#[derive(Clone, Debug)]
pub struct SentMessage {
    pub kind: &'static str,
    pub target: ChatTarget,
    pub text: String,
    pub reply_to: Option<i64>,
    pub message: MessageRef,
}

/// Recorded edit
#[derive(Clone, Debug)]
pub struct EditedMessage {
    pub kind: &'static str,
    pub message: MessageRef,
    pub text: String,
}

#[derive(Default)]
struct MessengerState {
    next_id: i64,
    sent: Vec<SentMessage>,
    edits: Vec<EditedMessage>,
    fail_text: bool,
    fail_video: bool,
}

/// Recording Messenger measuring with [`MarkdownMeasurer`]
#[derive(Clone, Default)]
pub struct MockMessenger {
    state: Arc<Mutex<MessengerState>>,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `send_text` fail.
    pub fn set_fail_text(&self, fail: bool) {
        self.state.lock().unwrap().fail_text = fail;
    }

    /// Make every `send_video` fail.
    pub fn set_fail_video(&self, fail: bool) {
        self.state.lock().unwrap().fail_video = fail;
    }

    pub fn get_sent(&self) -> Vec<SentMessage> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn get_edits(&self) -> Vec<EditedMessage> {
        self.state.lock().unwrap().edits.clone()
    }

    fn record(
        &self,
        kind: &'static str,
        target: &ChatTarget,
        text: &str,
        reply_to: Option<i64>,
    ) -> MessageRef {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let message = MessageRef {
            chat_id: target.chat_id,
            message_id: state.next_id,
            thread_id: target.thread_id,
            link: None,
        };
        state.sent.push(SentMessage {
            kind,
            target: *target,
            text: text.to_string(),
            reply_to,
            message: message.clone(),
        });
        message
    }
}

#[async_trait]
impl TextMeasurer for MockMessenger {
    async fn measure(&self, text: &str) -> composer::Result<Measurement> {
        MarkdownMeasurer.measure_text(text)
    }
}

#[async_trait]
impl Messenger for MockMessenger {
    async fn send_text(
        &self,
        target: &ChatTarget,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<MessageRef> {
        if self.state.lock().unwrap().fail_text {
            return Err(IngestionError::Messaging("send_text failed".into()));
        }
        Ok(self.record("text", target, text, reply_to))
    }

    async fn send_photo(
        &self,
        target: &ChatTarget,
        _photo_url: &str,
        caption: &str,
    ) -> Result<MessageRef> {
        Ok(self.record("photo", target, caption, None))
    }

    async fn send_video(&self, target: &ChatTarget, _path: &Path, caption: &str) -> Result<MessageRef> {
        if self.state.lock().unwrap().fail_video {
            return Err(IngestionError::Messaging("send_video failed".into()));
        }
        Ok(self.record("video", target, caption, None))
    }

    async fn edit_text(&self, message: &MessageRef, text: &str) -> Result<()> {
        self.state.lock().unwrap().edits.push(EditedMessage {
            kind: "text",
            message: message.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn edit_caption(&self, message: &MessageRef, caption: &str) -> Result<()> {
        self.state.lock().unwrap().edits.push(EditedMessage {
            kind: "caption",
            message: message.clone(),
            text: caption.to_string(),
        });
        Ok(())
    }

    async fn message_link(&self, message: &MessageRef) -> Result<String> {
        Ok(format!(
            "https://t.me/c/{}/{}",
            message.chat_id.unsigned_abs(),
            message.message_id
        ))
    }
}

// ============================================================================
// Mock Metadata Provider
// ============================================================================

#[derive(Default)]
struct MetadataState {
    subject: Option<SubjectDetail>,
    episodes: EpisodesResponse,
    torrent: TorrentDetail,
    teams: Vec<Team>,
    tags: Vec<Tag>,
    searches: Vec<String>,
}

/// MetadataProvider returning preset answers
#[derive(Clone, Default)]
pub struct MockMetadata {
    state: Arc<Mutex<MetadataState>>,
}

impl MockMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_subject(&self, subject: SubjectDetail) {
        self.state.lock().unwrap().subject = Some(subject);
    }

    pub fn set_episode_total(&self, total: i64) {
        self.state.lock().unwrap().episodes.total = total;
    }

    pub fn set_torrent(&self, torrent: TorrentDetail) {
        self.state.lock().unwrap().torrent = torrent;
    }

    pub fn set_teams(&self, teams: Vec<Team>) {
        self.state.lock().unwrap().teams = teams;
    }

    pub fn set_tags(&self, tags: Vec<Tag>) {
        self.state.lock().unwrap().tags = tags;
    }

    pub fn get_searches(&self) -> Vec<String> {
        self.state.lock().unwrap().searches.clone()
    }
}

#[async_trait]
impl MetadataProvider for MockMetadata {
    async fn search_subject(&self, keyword: &str) -> metadata::Result<Option<SubjectDetail>> {
        let mut state = self.state.lock().unwrap();
        state.searches.push(keyword.to_string());
        Ok(state.subject.clone())
    }

    async fn subject(&self, id: i64) -> metadata::Result<SubjectDetail> {
        self.state
            .lock()
            .unwrap()
            .subject
            .clone()
            .filter(|s| s.id == id)
            .ok_or_else(|| ProviderError::NotFound(format!("subject {}", id)))
    }

    async fn episodes(&self, _subject_id: i64) -> metadata::Result<EpisodesResponse> {
        Ok(self.state.lock().unwrap().episodes.clone())
    }

    async fn torrent_detail(&self, id: &str) -> metadata::Result<TorrentDetail> {
        let torrent = self.state.lock().unwrap().torrent.clone();
        if torrent.id != id {
            return Err(ProviderError::NotFound(id.to_string()));
        }
        Ok(torrent)
    }

    async fn teams(&self, _ids: &[String]) -> metadata::Result<Vec<Team>> {
        Ok(self.state.lock().unwrap().teams.clone())
    }

    async fn tags(&self, _ids: &[String]) -> metadata::Result<Vec<Tag>> {
        Ok(self.state.lock().unwrap().tags.clone())
    }

    fn name(&self) -> &'static str {
        "Mock"
    }
}

// ============================================================================
// Mock Downloader
// ============================================================================

struct DownloaderState {
    failures: usize,
    size: u64,
    content_path: String,
    downloads: Vec<AddTorrentOptions>,
    removed: Vec<(String, bool)>,
}

impl Default for DownloaderState {
    fn default() -> Self {
        Self {
            failures: 0,
            size: 300 * 1024 * 1024,
            content_path: "/nonexistent/herald/episode.mp4".into(),
            downloads: Vec::new(),
            removed: Vec::new(),
        }
    }
}

/// Downloader completing instantly with preset size and path
#[derive(Clone, Default)]
pub struct MockDownloader {
    state: Arc<Mutex<DownloaderState>>,
}

impl MockDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_size(&self, size: u64) {
        self.state.lock().unwrap().size = size;
    }

    /// Make the next `count` downloads time out.
    pub fn fail_downloads(&self, count: usize) {
        self.state.lock().unwrap().failures = count;
    }

    pub fn set_content_path(&self, path: impl Into<String>) {
        self.state.lock().unwrap().content_path = path.into();
    }

    pub fn get_downloads(&self) -> Vec<AddTorrentOptions> {
        self.state.lock().unwrap().downloads.clone()
    }

    pub fn get_removed(&self) -> Vec<(String, bool)> {
        self.state.lock().unwrap().removed.clone()
    }
}

#[async_trait]
impl Downloader for MockDownloader {
    async fn download(&self, options: AddTorrentOptions) -> downloader::Result<DownloadedTorrent> {
        let mut state = self.state.lock().unwrap();
        if options.url.is_empty() {
            return Err(DownloaderError::InvalidTorrent("empty url".into()));
        }
        if state.failures > 0 {
            state.failures -= 1;
            return Err(DownloaderError::Timeout(1));
        }
        let handle = format!("hash-{}", state.downloads.len());
        state.downloads.push(options);
        Ok(DownloadedTorrent {
            handle,
            total_size: state.size,
            content_path: state.content_path.clone(),
        })
    }

    async fn remove(&self, handle: &str, delete_files: bool) -> downloader::Result<()> {
        self.state
            .lock()
            .unwrap()
            .removed
            .push((handle.to_string(), delete_files));
        Ok(())
    }

    fn downloader_type(&self) -> &'static str {
        "mock"
    }
}
