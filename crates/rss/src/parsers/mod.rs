mod bangumi_moe;
mod torrent_feed;

pub use bangumi_moe::parse_bangumi_moe_feed;
pub use torrent_feed::parse_torrent_feed;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::RssError;

/// Fields shared by every RSS 2.0 torrent feed
#[derive(Debug, Default)]
pub(crate) struct RawItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub pub_date: Option<String>,
    pub author: Option<String>,
    pub enclosure: Option<String>,
}

/// Read every `<item>` of an RSS 2.0 document.
pub(crate) fn read_items(xml: &[u8]) -> Result<Vec<RawItem>, RssError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut buf = Vec::new();

    let mut current_item: Option<RawItem> = None;
    let mut current_element = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "item" {
                    current_item = Some(RawItem::default());
                } else if name == "enclosure" {
                    read_enclosure(&e, current_item.as_mut());
                }
                current_element = name;
            }
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"enclosure" {
                    read_enclosure(&e, current_item.as_mut());
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"item" {
                    if let Some(item) = current_item.take() {
                        items.push(item);
                    }
                }
                current_element.clear();
            }
            Ok(Event::Text(e)) => {
                if let Some(ref mut item) = current_item {
                    let text = e.unescape().unwrap_or_default().to_string();
                    assign_field(item, &current_element, text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(ref mut item) = current_item {
                    let text = String::from_utf8_lossy(&e.into_inner()).to_string();
                    assign_field(item, &current_element, text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(RssError::Parse(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    Ok(items)
}

fn assign_field(item: &mut RawItem, element: &str, text: String) {
    if text.is_empty() {
        return;
    }
    match element {
        "title" => item.title = Some(text),
        "link" => item.link = Some(text),
        "pubDate" => item.pub_date = Some(text),
        "author" | "dc:creator" => item.author = Some(text),
        _ => {}
    }
}

fn read_enclosure(e: &BytesStart<'_>, item: Option<&mut RawItem>) {
    let Some(item) = item else {
        return;
    };
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"url" {
            if let Ok(value) = attr.unescape_value() {
                item.enclosure = Some(value.to_string());
            }
        }
    }
}

/// Collapse runs of whitespace into single spaces.
pub(crate) fn normalize_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}
