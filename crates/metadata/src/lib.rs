//! Metadata providers
//!
//! Two remote sources feed the release pipeline:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │             MetadataProvider trait           │
//! │  search_subject(keyword) -> SubjectDetail    │
//! │  torrent_detail(id)      -> TorrentDetail    │
//! │  subject(id) / episodes(subject_id)          │
//! │  teams(ids) / tags(ids)                      │
//! └──────────────────────────────────────────────┘
//!                        △
//!                        │
//!                ┌───────┴────────┐
//!                │  HttpProvider  │
//!                └──┬──────────┬──┘
//!                   │          │
//!          ┌────────┴───┐ ┌────┴────────────┐
//!          │BgmtvClient │ │BangumiMoeClient │
//!          └────────────┘ └─────────────────┘
//! ```
//!
//! BGM.tv supplies show information (names, air date, rating, summary),
//! bangumi.moe supplies per-release details (team, tags, magnet).

mod bangumi_moe;
mod bgmtv;
mod error;
pub mod models;
mod provider;

pub use bangumi_moe::BangumiMoeClient;
pub use bgmtv::BgmtvClient;
pub use error::ProviderError;
pub use models::{
    Episode, EpisodeType, EpisodesResponse, InfoboxValue, Rating, SubjectDetail, SubjectTag, Tag, TagLocale, Team, TorrentDetail,
};
pub use provider::{HttpProvider, MetadataProvider};

pub type Result<T> = std::result::Result<T, ProviderError>;
