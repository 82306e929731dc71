//! Fansub release title parsing
//!
//! Turns free-text release titles from torrent feeds into structured
//! release records.
//!
//! # Components
//!
//! - [`TitleFilter`]: rejects titles that are never published
//! - [`extract_fansub_groups`]: groups from the leading bracket
//! - [`FansubRuleRegistry`]: per-group name extraction
//! - [`classify_episode`]: episode, batch range or special
//! - [`extract_source`]: streaming platform
//! - [`compare_episodes`]: total order used by every episode listing
//! - [`TitleParser`]: all of the above in one call
//!
//! # Example
//!
//! ```
//! use parser::{FansubRuleRegistry, TitleParser};
//!
//! let parser = TitleParser::new(FansubRuleRegistry::with_defaults());
//! let release = parser
//!     .parse("[ANi] 示例动画 - 05 [1080P][Baha][WEB-DL][AAC AVC][CHT][MP4]", Some("ANi"))
//!     .unwrap();
//!
//! assert_eq!(release.names, vec!["示例动画"]);
//! assert_eq!(release.episode.labels(), vec!["05"]);
//! assert_eq!(release.source, "Baha");
//! ```

mod classifier;
mod episode;
mod error;
mod fansub;
mod filter;
mod ordering;
mod rules;
mod source;
mod title;

pub use classifier::classify_episode;
pub use episode::{EpisodeToken, ReleaseEpisode, SpecialKind, UNKNOWN_EPISODE};
pub use error::ParseError;
pub use fansub::extract_fansub_groups;
pub use filter::TitleFilter;
pub use ordering::{compare_episodes, sort_episodes};
pub use rules::{
    FansubRuleRegistry, NameStrategy, bracket_after_group, dash_separated, slash_before_bracket,
};
pub use source::extract_source;
pub use title::{ParsedRelease, TitleParser};

pub type Result<T> = std::result::Result<T, ParseError>;
