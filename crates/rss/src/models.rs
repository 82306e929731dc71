use serde::{Deserialize, Serialize};

/// Site a feed item was published on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    /// bangumi.moe, details are looked up through its API
    Bangumi,
    /// share.dmhy.org
    Dmhy,
    /// acgnx.se
    Acgnx,
    /// Anything else, kept so callers can report it
    Unknown(String),
}

impl FeedKind {
    pub fn as_str(&self) -> &str {
        match self {
            FeedKind::Bangumi => "bangumi",
            FeedKind::Dmhy => "dmhy",
            FeedKind::Acgnx => "acgnx",
            FeedKind::Unknown(kind) => kind,
        }
    }
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configured feed with its URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedUrl {
    pub kind: FeedKind,
    pub url: String,
}

impl FeedUrl {
    pub fn new(kind: FeedKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
        }
    }

    /// bangumi.moe latest releases
    pub fn bangumi_moe() -> Self {
        Self::new(FeedKind::Bangumi, "https://bangumi.moe/rss/latest")
    }
}

/// One release announced by a feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Release title, whitespace-normalised
    pub title: String,
    /// Publish time rendered in UTC+8
    pub pub_date: String,
    pub kind: FeedKind,
    /// Site-specific torrent id (bangumi.moe)
    pub id: Option<String>,
    pub link: Option<String>,
    /// Magnet link or torrent URL
    pub magnet: Option<String>,
    /// Publishing team as reported by the site
    pub author: Option<String>,
}

impl FeedItem {
    pub fn new(kind: FeedKind, title: impl Into<String>, pub_date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pub_date: pub_date.into(),
            kind,
            id: None,
            link: None,
            magnet: None,
            author: None,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn magnet(mut self, magnet: impl Into<String>) -> Self {
        self.magnet = Some(magnet.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}
