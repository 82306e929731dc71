//! Release feed client
//!
//! Fetches the configured torrent feeds, parses them into [`FeedItem`]s and
//! merges them into one de-duplicated list per poll. Titles are filtered
//! with [`parser::TitleFilter`] as they are read.

mod client;
mod date;
mod error;
pub mod models;
mod parsers;

pub use client::{FeedSource, RssClient};
pub use date::format_pub_date;
pub use error::RssError;
pub use models::{FeedItem, FeedKind, FeedUrl};
pub use parsers::{parse_bangumi_moe_feed, parse_torrent_feed};

pub type Result<T> = std::result::Result<T, RssError>;
