use crate::date::format_pub_date;
use crate::models::{FeedItem, FeedKind};
use crate::RssError;

use super::{normalize_title, read_items};

/// Parse the bangumi.moe RSS feed.
///
/// The torrent id is the last path segment of the item link; the enclosure
/// carries the `.torrent` URL.
pub fn parse_bangumi_moe_feed(xml: &[u8]) -> Result<Vec<FeedItem>, RssError> {
    let items = read_items(xml)?
        .into_iter()
        .filter_map(|raw| {
            let title = normalize_title(raw.title.as_deref()?);
            let pub_date = format_pub_date(raw.pub_date.as_deref()?);
            let link = raw.link?;
            let id = link.trim_end_matches('/').rsplit('/').next()?.to_string();

            let mut item = FeedItem::new(FeedKind::Bangumi, title, pub_date)
                .id(id)
                .link(link);
            if let Some(torrent) = raw.enclosure {
                item = item.magnet(torrent);
            }
            Some(item)
        })
        .collect();

    Ok(items)
}
