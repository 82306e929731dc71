use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use composer::AnimeRecord;
use metadata::{MetadataProvider, ProviderError, SubjectDetail};
use parser::{TitleParser, extract_fansub_groups};
use regex::Regex;
use rss::{FeedItem, FeedKind};

use super::navigation::NavPublisher;
use super::publish::{PublishOutcome, ReleasePublisher};
use super::traits::{AnimeStore, ItemOutcome, ItemProcessor, Messenger, Result, SkipReason};
use crate::models::{ChatTarget, ReleaseDraft, TorrentStatus};

/// Season tags such as `2023年10月`
static SEASON_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}年").expect("Invalid season tag pattern"));

/// Chats the processor writes to
#[derive(Debug, Clone, Copy)]
pub struct ProcessorTargets {
    /// Admin thread reviewing first releases of new shows
    pub review: ChatTarget,
    /// Public release channel
    pub release: ChatTarget,
}

/// Per-item stages: dedup, team lookup, parse, then publish
pub struct ReleaseProcessor {
    store: Arc<dyn AnimeStore>,
    metadata: Arc<dyn MetadataProvider>,
    messenger: Arc<dyn Messenger>,
    parser: TitleParser,
    publisher: ReleasePublisher,
    nav: NavPublisher,
    targets: ProcessorTargets,
}

/// Team, magnet and extra names found for an item before parsing
struct TeamInfo {
    team: String,
    magnet: String,
    extra_names: Vec<String>,
}

impl ReleaseProcessor {
    pub fn new(
        store: Arc<dyn AnimeStore>,
        metadata: Arc<dyn MetadataProvider>,
        messenger: Arc<dyn Messenger>,
        parser: TitleParser,
        publisher: ReleasePublisher,
        nav: NavPublisher,
        targets: ProcessorTargets,
    ) -> Self {
        Self {
            store,
            metadata,
            messenger,
            parser,
            publisher,
            nav,
            targets,
        }
    }

    async fn resolve_team(&self, item: &FeedItem, fansub: &[String]) -> Result<Option<TeamInfo>> {
        match &item.kind {
            FeedKind::Bangumi => {
                let id = item
                    .id
                    .as_deref()
                    .ok_or_else(|| ProviderError::NotFound(format!("torrent id of '{}'", item.title)))?;
                let detail = self.metadata.torrent_detail(id).await?;

                let team = match &detail.team_id {
                    Some(team_id) => self
                        .metadata
                        .teams(std::slice::from_ref(team_id))
                        .await?
                        .into_iter()
                        .next()
                        .map(|t| t.name),
                    None => None,
                };
                let team = team.unwrap_or_else(|| fansub[0].clone());

                let extra_names = self
                    .metadata
                    .tags(&detail.tag_ids)
                    .await?
                    .iter()
                    .filter(|tag| tag.is_bangumi())
                    .flat_map(|tag| tag.locale_names())
                    .collect();

                let magnet = detail
                    .magnet
                    .or_else(|| item.magnet.clone())
                    .unwrap_or_default();

                Ok(Some(TeamInfo {
                    team,
                    magnet,
                    extra_names,
                }))
            }
            FeedKind::Dmhy | FeedKind::Acgnx => Ok(Some(TeamInfo {
                team: item.author.clone().unwrap_or_default(),
                magnet: item.magnet.clone().unwrap_or_default(),
                extra_names: Vec::new(),
            })),
            FeedKind::Unknown(_) => Ok(None),
        }
    }

    /// Unknown show: save the draft, look it up and send it for review.
    async fn new_release(&self, draft: &ReleaseDraft) -> Result<ItemOutcome> {
        self.store.save_draft(draft).await?;

        let keyword = &draft.release.names[0];
        let Some(subject) = self.metadata.search_subject(keyword).await? else {
            let prompt = format!(
                "未找到番剧信息，请手动补充\n标题: {}\n名称: {}",
                draft.title,
                draft.release.names.join(" / ")
            );
            self.messenger
                .send_text(&self.targets.review, &prompt, None)
                .await?;
            return Ok(ItemOutcome::Drafted { anime_id: None });
        };

        let excluded = self.store.tag_exclude_list().await?;
        let mut anime = anime_from_subject(&subject, &draft.release.names, &excluded);
        if anime.episode_count.is_none() {
            match self.metadata.episodes(subject.id).await {
                Ok(episodes) if episodes.total > 0 => {
                    anime.episode_count = Some(episodes.total.to_string());
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(
                    "[{}] No episode listing for {}: {}",
                    draft.team,
                    subject.id,
                    e
                ),
            }
        }
        self.store.save_anime(&anime).await?;

        let sent = self
            .publisher
            .publish(&anime, draft, &self.targets.review)
            .await?;
        if let PublishOutcome::Skipped(reason) = sent {
            return Ok(ItemOutcome::Skipped(reason));
        }

        let prompt = format!(
            "新番剧待确认: {}\n标题: {}\n[BGM](https://bgm.tv/subject/{})",
            anime.display_name(),
            draft.title,
            anime.id
        );
        self.messenger
            .send_text(&self.targets.review, &prompt, None)
            .await?;
        Ok(ItemOutcome::Drafted {
            anime_id: Some(anime.id),
        })
    }

    /// Let the next poll retry a title whose release was not sent.
    async fn mark_failed(&self, draft: &ReleaseDraft) {
        match self.store.torrent_status(&draft.title).await {
            Ok(Some(TorrentStatus::Pending)) => {
                if let Err(e) = self
                    .store
                    .update_torrent_status(&draft.title, TorrentStatus::Failed)
                    .await
                {
                    tracing::warn!(
                        "[{}] Failed to mark '{}' as failed: {}",
                        draft.team,
                        draft.title,
                        e
                    );
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(
                "[{}] Failed to read status of '{}': {}",
                draft.team,
                draft.title,
                e
            ),
        }
    }

    /// Known show: publish to the channel and refresh its card.
    async fn update_release(&self, anime: &AnimeRecord, draft: &ReleaseDraft) -> Result<ItemOutcome> {
        match self
            .publisher
            .publish(anime, draft, &self.targets.release)
            .await?
        {
            PublishOutcome::Skipped(reason) => Ok(ItemOutcome::Skipped(reason)),
            PublishOutcome::Sent(_) => {
                if let Err(e) = self.nav.refresh(anime.id).await {
                    tracing::error!(
                        "[{}] Failed to refresh card of {}: {}",
                        draft.team,
                        anime.id,
                        e
                    );
                }
                Ok(ItemOutcome::Published {
                    anime_id: anime.id,
                    episode: draft.episode_label(),
                })
            }
        }
    }
}

#[async_trait]
impl ItemProcessor for ReleaseProcessor {
    async fn process(&self, item: FeedItem) -> Result<ItemOutcome> {
        if self.store.has_title(&item.title).await? {
            return Ok(ItemOutcome::Skipped(SkipReason::KnownTitle));
        }

        let fansub = extract_fansub_groups(&item.title);
        if fansub.is_empty() {
            return Ok(ItemOutcome::Skipped(SkipReason::NoFansubGroup));
        }

        let Some(info) = self.resolve_team(&item, &fansub).await? else {
            return Ok(ItemOutcome::Skipped(SkipReason::UnsupportedKind(
                item.kind.to_string(),
            )));
        };

        let mut release = match self.parser.parse(&item.title, Some(&info.team)) {
            Ok(release) => release,
            Err(e) => {
                tracing::debug!("[{}] Cannot parse '{}': {}", info.team, item.title, e);
                return Ok(ItemOutcome::Skipped(SkipReason::Unparsed(e)));
            }
        };
        for name in info.extra_names {
            if !release.names.contains(&name) {
                release.names.push(name);
            }
        }
        if release.names.is_empty() {
            return Ok(ItemOutcome::Skipped(SkipReason::Unnamed));
        }

        let draft = ReleaseDraft {
            title: item.title.clone(),
            pub_date: item.pub_date.clone(),
            kind: item.kind.clone(),
            magnet: info.magnet,
            team: info.team,
            fansub,
            release,
        };
        self.store
            .add_torrent(&draft.title, &draft.magnet, TorrentStatus::Pending)
            .await?;

        let result = match self.store.find_release(&draft.release.names).await {
            Ok(Some(anime)) => self.update_release(&anime, &draft).await,
            Ok(None) => self.new_release(&draft).await,
            Err(e) => Err(e),
        };
        if result.is_err() {
            self.mark_failed(&draft).await;
        }
        result
    }
}

/// Show record for a BGM.tv subject, merged with the names parsed from the release.
pub fn anime_from_subject(
    subject: &SubjectDetail,
    parsed_names: &[String],
    excluded_tags: &[String],
) -> AnimeRecord {
    let name_cn = if subject.name_cn.trim().is_empty() {
        subject.infobox_text("中文名").unwrap_or_default()
    } else {
        subject.name_cn.clone()
    };

    let mut names = subject.names();
    if !name_cn.is_empty() && !names.contains(&name_cn) {
        names.insert(0, name_cn.clone());
    }
    for name in parsed_names {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }

    let episode_count = subject
        .infobox_text("话数")
        .or_else(|| (subject.eps > 0).then(|| subject.eps.to_string()));

    AnimeRecord {
        id: subject.id,
        name: subject.name.clone(),
        name_cn,
        names,
        tags: subject
            .tags
            .iter()
            .map(|t| t.name.clone())
            .filter(|t| !is_date_tag(t) && !excluded_tags.contains(t))
            .collect(),
        summary: subject.summary.clone(),
        score: subject
            .rating
            .as_ref()
            .map(|r| r.score)
            .filter(|score| *score > 0.0),
        episode_count,
        airing_start: subject.infobox_text("放送开始"),
        airing_day: subject.infobox_text("放送星期"),
        nsfw: subject.nsfw,
        image: subject.image_url().map(str::to_string),
        ..Default::default()
    }
}

/// Year and season tags carry no genre information.
fn is_date_tag(tag: &str) -> bool {
    SEASON_TAG.is_match(tag) || tag.chars().all(|c| c.is_ascii_digit())
}
