//! Source platform extraction (`Baha`, `CR`, `B-Global`, ...).

use regex::Regex;
use std::sync::LazyLock;

/// Title shapes that carry a platform name, in priority order
static SOURCE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // [Bilibili WEB-DL 1080P AVC 8bit AAC MKV]
        r"(?i)\[([A-Za-z]+)\s+WEB-DL[^\]]*\]",
        // [Baha][WEB-DL]
        r"(?i)\[([A-Za-z]+)\]\[WEB-DL\]",
        // (CR 1920x1080), (B-Global 1920x1080)
        r"(?i)\(([A-Za-z-]+)\s+\d+x\d+",
        // (ABEMA 1920x1080 AVC AAC MP4)
        r"(?i)\(([A-Za-z]+)\s+",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("Invalid source pattern"))
    .collect()
});

/// Technical markers that look like a platform but are not
static TECHNICAL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:WebRip|WEB-DL|MP4|MKV|AVC|HEVC|AAC|1080P|720P|CHT|CHS|GB|BIG5|x264|x265|10bit|8bit)$",
    )
    .expect("Invalid technical token pattern")
});

static KNOWN_PLATFORM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:Baha|CR|Bilibili|Netflix|Amazon|Hulu|Funimation|iQIYI|Youku|ABEMA|B-Global)$")
        .expect("Invalid platform pattern")
});

static SQUARE_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").expect("Invalid bracket pattern"));

/// Extract the streaming platform a release was ripped from.
///
/// Returns an empty string when the title names no platform.
pub fn extract_source(title: &str) -> String {
    for pattern in SOURCE_PATTERNS.iter() {
        let Some(candidate) = pattern.captures(title).and_then(|c| c.get(1)) else {
            continue;
        };
        let candidate = candidate.as_str().trim();
        if !candidate.is_empty() && !TECHNICAL_TOKEN.is_match(candidate) {
            return candidate.to_string();
        }
    }

    SQUARE_BRACKET
        .captures_iter(title)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .find(|content| KNOWN_PLATFORM.is_match(content))
        .map(ToString::to_string)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_dl_bracket() {
        assert_eq!(
            extract_source("[LoliHouse] Title - 01 [Bilibili WEB-DL 1080P AVC 8bit AAC MKV]"),
            "Bilibili"
        );
        assert_eq!(extract_source("[GroupX] Title [01][Baha][WEB-DL]"), "Baha");
    }

    #[test]
    fn test_parenthesised_platform() {
        assert_eq!(extract_source("[GroupX] Title - 01 (CR 1920x1080 AVC AAC MKV)"), "CR");
        assert_eq!(extract_source("[GroupX] Title - 01 (B-Global 1920x1080 HEVC)"), "B-Global");
        assert_eq!(extract_source("[GroupX] Title - 01 (ABEMA 1080p)"), "ABEMA");
    }

    #[test]
    fn test_technical_token_rejected() {
        assert_eq!(extract_source("[GroupX] Title - 01 (AVC 1920x1080)"), "");
        assert_eq!(extract_source("[GroupX] Title - 01 [WebRip WEB-DL 1080p]"), "");
    }

    #[test]
    fn test_known_platform_fallback() {
        assert_eq!(
            extract_source("[ANi] Title - 01 [1080P][Baha][WEB-DL-ish][AAC AVC][CHT][MP4]"),
            "Baha"
        );
    }

    #[test]
    fn test_no_source() {
        assert_eq!(
            extract_source("[幻樱字幕组][示例动画][12][1080P][GB_MP4][1920X1080].mp4"),
            ""
        );
    }
}
