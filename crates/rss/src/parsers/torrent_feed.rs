use crate::date::format_pub_date;
use crate::models::{FeedItem, FeedKind};
use crate::RssError;

use super::{normalize_title, read_items};

/// Parse a dmhy/acgnx style feed, where each item names its author and the
/// enclosure is a magnet link.
pub fn parse_torrent_feed(xml: &[u8], kind: FeedKind) -> Result<Vec<FeedItem>, RssError> {
    let items = read_items(xml)?
        .into_iter()
        .filter_map(|raw| {
            let title = normalize_title(raw.title.as_deref()?);
            let pub_date = format_pub_date(raw.pub_date.as_deref()?);

            let mut item = FeedItem::new(kind.clone(), title, pub_date);
            if let Some(magnet) = raw.enclosure.or_else(|| raw.link.clone()) {
                item = item.magnet(magnet);
            }
            if let Some(link) = raw.link {
                item = item.link(link);
            }
            if let Some(author) = raw.author {
                item = item.author(author.trim());
            }
            Some(item)
        })
        .collect();

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0">
  <channel>
    <item>
      <title><![CDATA[[北宇治字幕组] 示例动画 / Example [05][WebRip][1080p]]]></title>
      <link>http://share.dmhy.org/topics/view/1.html</link>
      <pubDate>Fri, 05 Apr 2024 21:30:00 +0800</pubDate>
      <enclosure url="magnet:?xt=urn:btih:ABCDEF&amp;dn=x" length="1" type="application/x-bittorrent"></enclosure>
      <author><![CDATA[北宇治字幕组]]></author>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_dmhy() {
        let items = parse_torrent_feed(FEED.as_bytes(), FeedKind::Dmhy).unwrap();
        assert_eq!(items.len(), 1);

        let item = &items[0];
        assert_eq!(item.kind, FeedKind::Dmhy);
        assert_eq!(item.title, "[北宇治字幕组] 示例动画 / Example [05][WebRip][1080p]");
        assert_eq!(item.author.as_deref(), Some("北宇治字幕组"));
        assert_eq!(item.magnet.as_deref(), Some("magnet:?xt=urn:btih:ABCDEF&dn=x"));
        assert_eq!(item.pub_date, "2024年04月05日 09:30PM");
    }
}
