use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// BGM.tv subject type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum SubjectType {
    Book = 1,
    #[default]
    Anime = 2,
    Music = 3,
    Game = 4,
    Real = 6,
}

/// Search request body for POST /v0/search/subjects
#[derive(Debug, Clone, Serialize)]
pub struct SearchSubjectsRequest {
    pub keyword: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<SearchFilter>,
}

/// Search filter options
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchFilter {
    /// Subject type filter
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub subject_type: Option<Vec<SubjectType>>,
    /// Air date constraints, e.g. `<=2024-04-05`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_date: Option<Vec<String>>,
}

/// Search response from POST /v0/search/subjects
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSubjectsResponse {
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub data: Vec<SubjectSummary>,
}

/// Subject item in search results
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub name_cn: String,
    pub date: Option<String>,
}

/// Full subject from GET /v0/subjects/{id}
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectDetail {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub name_cn: String,
    #[serde(default)]
    pub summary: String,
    pub date: Option<String>,
    #[serde(default)]
    pub nsfw: bool,
    pub images: Option<SubjectImages>,
    #[serde(default)]
    pub infobox: Vec<InfoboxItem>,
    pub rating: Option<Rating>,
    #[serde(default)]
    pub tags: Vec<SubjectTag>,
    #[serde(default)]
    pub eps: i64,
}

/// BGM.tv episode type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum EpisodeType {
    #[default]
    Main = 0,
    Special = 1,
    Opening = 2,
    Ending = 3,
    Trailer = 4,
    Mad = 5,
    Other = 6,
}

/// Episode item from GET /v0/episodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub episode_type: EpisodeType,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_cn: String,
    #[serde(default)]
    pub sort: f64,
    pub ep: Option<f64>,
    #[serde(default)]
    pub airdate: String,
}

/// Paged episode list of a subject
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EpisodesResponse {
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub data: Vec<Episode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubjectImages {
    #[serde(default)]
    pub large: String,
    #[serde(default)]
    pub common: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rating {
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectTag {
    pub name: String,
    #[serde(default)]
    pub count: i64,
}

/// One infobox row, e.g. `{"key": "中文名", "value": "示例动画"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoboxItem {
    pub key: String,
    pub value: InfoboxValue,
}

/// Infobox values are either plain text or a list of `{v}` entries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InfoboxValue {
    Text(String),
    List(Vec<InfoboxEntry>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfoboxEntry {
    #[serde(default)]
    pub k: Option<String>,
    pub v: String,
}

impl InfoboxValue {
    /// All values as separate strings.
    pub fn values(&self) -> Vec<String> {
        match self {
            InfoboxValue::Text(text) => vec![text.clone()],
            InfoboxValue::List(entries) => entries.iter().map(|e| e.v.clone()).collect(),
        }
    }
}

impl SubjectDetail {
    /// First value of an infobox row.
    pub fn infobox_text(&self, key: &str) -> Option<String> {
        self.infobox
            .iter()
            .find(|item| item.key == key)
            .and_then(|item| item.value.values().into_iter().next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Chinese name, original name and every 别名 entry, de-duplicated.
    pub fn names(&self) -> Vec<String> {
        let aliases = self
            .infobox
            .iter()
            .filter(|item| item.key == "别名")
            .flat_map(|item| item.value.values());

        let mut names: Vec<String> = Vec::new();
        for name in [self.name_cn.clone(), self.name.clone()]
            .into_iter()
            .chain(aliases)
        {
            let name = name.trim();
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Poster URL, if the subject has one.
    pub fn image_url(&self) -> Option<&str> {
        self.images
            .as_ref()
            .map(|images| images.large.as_str())
            .filter(|url| !url.is_empty())
    }
}

/// Torrent detail from bangumi.moe
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TorrentDetail {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub team_id: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    pub magnet: Option<String>,
}

/// Publishing team on bangumi.moe
#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

/// Tag on bangumi.moe
#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// `bangumi`, `team`, `lang`, `resolution`, ...
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub locale: TagLocale,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagLocale {
    pub zh_cn: Option<String>,
    pub ja: Option<String>,
    pub en: Option<String>,
}

impl Tag {
    /// Show-name tags carry the title in several locales.
    pub fn is_bangumi(&self) -> bool {
        self.kind == "bangumi"
    }

    /// Localised names in zh_cn, ja, en order.
    pub fn locale_names(&self) -> Vec<String> {
        [&self.locale.zh_cn, &self.locale.ja, &self.locale.en]
            .into_iter()
            .flatten()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }
}
