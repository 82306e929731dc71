//! Text fragments shared by the card, its pages and release captions.

use std::sync::LazyLock;

use parser::{EpisodeToken, compare_episodes};
use regex::Regex;

use crate::models::{AnimeRecord, BtEntry, ResourceGroup};

static UNSAFE_TAG_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\p{Han}\p{Hiragana}\p{Katakana}\p{Latin}0-9_ー]").expect("Invalid tag pattern")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace pattern"));

static AIRING_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})年(\d{1,2})月").expect("Invalid airing month pattern")
});

/// Reduce `text` to characters a hashtag can carry.
///
/// ```
/// assert_eq!(composer::safe_tag(" Lilith-Raws ❀ "), "LilithRaws");
/// assert_eq!(composer::safe_tag("北宇治字幕组"), "北宇治字幕组");
/// ```
pub fn safe_tag(text: &str) -> String {
    UNSAFE_TAG_CHARS.replace_all(text.trim(), "").into_owned()
}

/// `#tag` list, dropping empty and purely numeric tags.
pub fn format_tags<S: AsRef<str>>(tags: &[S]) -> String {
    tags.iter()
        .map(|tag| safe_tag(tag.as_ref()))
        .filter(|tag| !tag.is_empty() && !tag.chars().all(|c| c.is_ascii_digit()))
        .map(|tag| format!("#{}", tag))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `2023年9月29日` -> `2023年9月`
pub fn anime_date(airing_start: Option<&str>) -> Option<String> {
    let caps = AIRING_MONTH.captures(airing_start?)?;
    Some(format!("{}年{}月", &caps[1], &caps[2]))
}

/// Quoted resource section of one fansub group.
///
/// Entries without a message link are left out; a group with no linked
/// entry renders nothing.
pub fn format_section(group: &ResourceGroup) -> Option<String> {
    let mut entries: Vec<(EpisodeToken, &BtEntry)> = group
        .entries
        .iter()
        .filter(|entry| entry.link().is_some())
        .map(|entry| (EpisodeToken::parse(&entry.episode), entry))
        .collect();
    if entries.is_empty() {
        return None;
    }
    entries.sort_by(|(a, _), (b, _)| compare_episodes(a, b));

    let links = entries
        .iter()
        .filter_map(|(_, entry)| {
            entry
                .link()
                .map(|link| format!("[{}]({})", entry.episode, link))
        })
        .collect::<Vec<_>>()
        .join(" | ");

    Some(quote(&format!("[#{}]\n{}", safe_tag(&group.label), links)))
}

/// One section per group, in index order.
pub fn format_sections(groups: &[ResourceGroup]) -> Vec<String> {
    groups.iter().filter_map(format_section).collect()
}

/// Prefix every non-blank line with `> `.
pub fn quote(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("> {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Caption of a single release announcement.
pub fn release_caption(anime: &AnimeRecord, title: &str, fansub: &[String], pub_date: &str) -> String {
    let mut caption = String::new();
    if let Some(date) = anime_date(anime.airing_start.as_deref()) {
        caption.push_str(&format!("#{} ", date));
    }
    if anime.nsfw {
        caption.push_str("#NSFW ");
    }
    caption.push_str(title);
    caption.push_str(&format!("\n>原名称: {}", anime.name));
    caption.push_str(&format!("\n>中文名: {}", anime.name_cn));
    caption.push_str(&format!("\n>发布组: {}", format_tags(fansub)));
    if !pub_date.is_empty() {
        caption.push_str(&format!("\n>发布时间: {}", pub_date));
    }

    let name_tag = safe_tag(anime.display_name());
    let group_tags = fansub
        .iter()
        .map(|group| format!("#{}_{}", safe_tag(&WHITESPACE.replace_all(group, "_")), name_tag))
        .collect::<Vec<_>>()
        .join(" ");
    caption.push_str(&format!("\n\n追踪标签：\n>名称: #{}\n>番剧组: {}", name_tag, group_tags));

    if let Some(link) = anime.nav_message.as_ref().and_then(|m| m.link.as_deref()) {
        caption.push_str(&format!("\n\n[番剧信息]({})", link));
    }
    caption
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRef;

    fn entry(episode: &str, link: Option<&str>) -> BtEntry {
        BtEntry {
            episode: episode.into(),
            message: link.map(|l| MessageRef::new(1, 1).link(l)),
            title: String::new(),
            source: String::new(),
            names: Vec::new(),
        }
    }

    #[test]
    fn test_safe_tag() {
        assert_eq!(safe_tag("喵萌奶茶屋 & LoliHouse"), "喵萌奶茶屋LoliHouse");
        assert_eq!(safe_tag("葬送のフリーレン"), "葬送のフリーレン");
        assert_eq!(safe_tag("Re:Zero-2nd"), "ReZero2nd");
    }

    #[test]
    fn test_format_tags_drops_numbers() {
        assert_eq!(format_tags(&["TV", "2023", "", "奇幻"]), "#TV #奇幻");
        assert_eq!(format_tags::<&str>(&[]), "");
    }

    #[test]
    fn test_anime_date() {
        assert_eq!(anime_date(Some("2023年9月29日")).as_deref(), Some("2023年9月"));
        assert_eq!(anime_date(Some("2023-09-29")), None);
        assert_eq!(anime_date(None), None);
    }

    #[test]
    fn test_section_sorts_and_drops_unlinked() {
        let group = ResourceGroup {
            label: "Lilith-Raws".into(),
            entries: vec![
                entry("03", Some("l3")),
                entry("OVA01", Some("lo")),
                entry("01", Some("l1")),
                entry("02", None),
                entry("01v2", Some("l1v2")),
            ],
        };
        assert_eq!(
            format_section(&group).unwrap(),
            "> [#LilithRaws]\n> [01](l1) | [01v2](l1v2) | [OVA01](lo) | [03](l3)"
        );
    }

    #[test]
    fn test_section_without_links() {
        let group = ResourceGroup {
            label: "ANi".into(),
            entries: vec![entry("01", None)],
        };
        assert!(format_section(&group).is_none());
    }

    #[test]
    fn test_release_caption() {
        let anime = AnimeRecord {
            name: "Sousou no Frieren".into(),
            name_cn: "葬送的芙莉莲".into(),
            airing_start: Some("2023年9月29日".into()),
            nav_message: Some(MessageRef::new(1, 9).link("https://t.me/c/1/9")),
            ..Default::default()
        };
        let caption = release_caption(
            &anime,
            "[北宇治字幕组] 葬送的芙莉莲 [01]",
            &["北宇治字幕组".to_string(), "Kita Sub".to_string()],
            "2023年09月29日 11:00PM",
        );
        assert_eq!(
            caption,
            "#2023年9月 [北宇治字幕组] 葬送的芙莉莲 [01]\n\
             >原名称: Sousou no Frieren\n\
             >中文名: 葬送的芙莉莲\n\
             >发布组: #北宇治字幕组 #KitaSub\n\
             >发布时间: 2023年09月29日 11:00PM\n\n\
             追踪标签：\n\
             >名称: #葬送的芙莉莲\n\
             >番剧组: #北宇治字幕组_葬送的芙莉莲 #Kita_Sub_葬送的芙莉莲\n\n\
             [番剧信息](https://t.me/c/1/9)"
        );
    }
}
