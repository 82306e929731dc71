use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reference to a message already sent to the messaging surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i64,
    #[serde(default)]
    pub thread_id: Option<i64>,
    #[serde(default)]
    pub link: Option<String>,
}

impl MessageRef {
    pub fn new(chat_id: i64, message_id: i64) -> Self {
        Self {
            chat_id,
            message_id,
            thread_id: None,
            link: None,
        }
    }

    pub fn thread(mut self, thread_id: i64) -> Self {
        self.thread_id = Some(thread_id);
        self
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// One published release inside a fansub group's episode list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BtEntry {
    /// Episode label as rendered, e.g. `12`, `12v2`, `OVA01`
    pub episode: String,
    pub message: Option<MessageRef>,
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub names: Vec<String>,
}

impl BtEntry {
    pub fn link(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|m| m.link.as_deref())
            .filter(|link| !link.is_empty())
    }
}

/// Episode list of one fansub group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub label: String,
    pub entries: Vec<BtEntry>,
}

impl ResourceGroup {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            entries: Vec::new(),
        }
    }

    /// Add an entry, replacing any earlier entry for the same episode.
    pub fn upsert(&mut self, entry: BtEntry) {
        match self.entries.iter_mut().find(|e| e.episode == entry.episode) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }
}

/// Show record with its per-group episode index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimeRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub name_cn: String,
    /// Every known name, used to match incoming releases
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: String,
    pub score: Option<f64>,
    pub episode_count: Option<String>,
    pub airing_start: Option<String>,
    pub airing_day: Option<String>,
    #[serde(default)]
    pub nsfw: bool,
    pub image: Option<String>,
    #[serde(default)]
    pub episode_index: Vec<ResourceGroup>,
    pub nav_message: Option<MessageRef>,
    /// Continuation pages by page number, starting at 1
    #[serde(default)]
    pub nav_pages: BTreeMap<usize, MessageRef>,
}

impl AnimeRecord {
    /// Chinese name when known, otherwise the original name.
    pub fn display_name(&self) -> &str {
        if self.name_cn.trim().is_empty() {
            &self.name
        } else {
            &self.name_cn
        }
    }

    /// Insert an entry into `group`'s list, creating the group when new.
    pub fn upsert_entry(&mut self, group: &str, entry: BtEntry) {
        match self.episode_index.iter_mut().find(|g| g.label == group) {
            Some(existing) => existing.upsert(entry),
            None => {
                let mut new_group = ResourceGroup::new(group);
                new_group.upsert(entry);
                self.episode_index.push(new_group);
            }
        }
    }
}
