use parser::ParsedRelease;
use rss::FeedKind;
use serde::{Deserialize, Serialize};

/// A release that passed parsing, with everything needed to publish it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseDraft {
    pub title: String,
    pub pub_date: String,
    pub kind: FeedKind,
    /// Magnet link or torrent URL
    pub magnet: String,
    /// Publishing team, used for fansub rule lookup
    pub team: String,
    /// Groups from the title's leading bracket
    pub fansub: Vec<String>,
    pub release: ParsedRelease,
}

impl ReleaseDraft {
    /// Episode label stored in the index, `未知` when unresolved.
    pub fn episode_label(&self) -> String {
        self.release.episode.index_label()
    }

    /// Episode-index group: the title's fansub groups joined with `_`.
    pub fn group_label(&self) -> String {
        if self.fansub.is_empty() {
            return self.team.clone();
        }
        self.fansub.join("_")
    }
}

/// Processing state of a seen torrent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TorrentStatus {
    Pending,
    Sent,
    Skipped,
    /// Processing errored; the next poll retries the title
    Failed,
}

impl TorrentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TorrentStatus::Pending => "等待下载",
            TorrentStatus::Sent => "已发送",
            TorrentStatus::Skipped => "已跳过",
            TorrentStatus::Failed => "处理失败",
        }
    }
}

impl std::fmt::Display for TorrentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Seen torrent, keyed by release title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentRecord {
    pub title: String,
    pub magnet: String,
    pub status: TorrentStatus,
}

/// Chat, and optionally forum thread, a message goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTarget {
    pub chat_id: i64,
    pub thread_id: Option<i64>,
}

impl ChatTarget {
    pub fn chat(chat_id: i64) -> Self {
        Self {
            chat_id,
            thread_id: None,
        }
    }

    pub fn thread(chat_id: i64, thread_id: Option<i64>) -> Self {
        Self { chat_id, thread_id }
    }
}
