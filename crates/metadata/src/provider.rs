//! Metadata provider trait definition

use async_trait::async_trait;

use crate::models::{EpisodesResponse, SubjectDetail, SubjectSummary, Tag, Team, TorrentDetail};
use crate::{BangumiMoeClient, BgmtvClient};

/// Unified metadata provider trait
///
/// The pipeline only talks to this trait; tests substitute in-memory
/// implementations.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Find the show that best matches `keyword`, with full detail.
    async fn search_subject(&self, keyword: &str) -> crate::Result<Option<SubjectDetail>>;

    /// Current detail of a known subject.
    async fn subject(&self, id: i64) -> crate::Result<SubjectDetail>;

    /// Main episode listing of a subject.
    async fn episodes(&self, subject_id: i64) -> crate::Result<EpisodesResponse>;

    /// Release detail for a bangumi.moe torrent id.
    async fn torrent_detail(&self, id: &str) -> crate::Result<TorrentDetail>;

    async fn teams(&self, ids: &[String]) -> crate::Result<Vec<Team>>;

    async fn tags(&self, ids: &[String]) -> crate::Result<Vec<Tag>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Provider backed by the BGM.tv and bangumi.moe HTTP APIs
pub struct HttpProvider {
    bgmtv: BgmtvClient,
    bangumi_moe: BangumiMoeClient,
}

impl HttpProvider {
    pub fn new(bgmtv: BgmtvClient, bangumi_moe: BangumiMoeClient) -> Self {
        Self { bgmtv, bangumi_moe }
    }

    /// Both clients sharing one reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self::new(
            BgmtvClient::with_client(client.clone()),
            BangumiMoeClient::with_client(client),
        )
    }
}

#[async_trait]
impl MetadataProvider for HttpProvider {
    async fn search_subject(&self, keyword: &str) -> crate::Result<Option<SubjectDetail>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(None);
        }

        let response = self.bgmtv.search_anime(keyword).await?;
        let Some(best) = best_match(&response.data, keyword) else {
            tracing::debug!("[{}] No subject found for '{}'", self.name(), keyword);
            return Ok(None);
        };

        tracing::debug!(
            "[{}] '{}' matched subject {} ({})",
            self.name(),
            keyword,
            best.id,
            best.name
        );
        Ok(Some(self.bgmtv.get_subject(best.id).await?))
    }

    async fn subject(&self, id: i64) -> crate::Result<SubjectDetail> {
        self.bgmtv.get_subject(id).await
    }

    async fn episodes(&self, subject_id: i64) -> crate::Result<EpisodesResponse> {
        self.bgmtv.get_episodes(subject_id).await
    }

    async fn torrent_detail(&self, id: &str) -> crate::Result<TorrentDetail> {
        self.bangumi_moe.torrent(id).await
    }

    async fn teams(&self, ids: &[String]) -> crate::Result<Vec<Team>> {
        self.bangumi_moe.teams(ids).await
    }

    async fn tags(&self, ids: &[String]) -> crate::Result<Vec<Tag>> {
        self.bangumi_moe.tags(ids).await
    }

    fn name(&self) -> &'static str {
        "BGM.tv"
    }
}

/// Exact name match first, otherwise the search engine's top hit.
fn best_match<'a>(results: &'a [SubjectSummary], keyword: &str) -> Option<&'a SubjectSummary> {
    results
        .iter()
        .find(|s| s.name == keyword || s.name_cn == keyword)
        .or_else(|| results.first())
}
