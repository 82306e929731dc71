//! Release title filter
//!
//! Rejects titles the channel never publishes: traditional-script or
//! embedded-subtitle releases, compilations, restricted resolutions and
//! batch ranges. A few fansub groups publish several variants of every
//! episode, for those only the preferred variant passes.

use regex::Regex;
use std::sync::LazyLock;

/// Substrings that reject a title outright.
const DENYLIST: &[&str] = &[
    "内封",
    "繁",
    "合集",
    "無字幕",
    "粵語",
    "整理搬运",
    "無對白字幕",
    "BIG5",
    "[720p]",
];

/// Whole-word markers: finished-season packs and MKV remuxes
static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:Fin|MKV)\b").expect("Invalid word pattern"));

/// Batch range: [01-12] or (01-12)
static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\d{1,3}-\d{1,3}\]|\(\d{1,3}-\d{1,3}\)").expect("Invalid range pattern")
});

const HUANYING: &str = "幻樱字幕组";
const YOUHA: &str = "悠哈璃羽字幕社";

/// Stateless title predicate
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleFilter;

impl TitleFilter {
    pub fn new() -> Self {
        Self
    }

    /// Returns `true` when the title may be published.
    pub fn allow(&self, title: &str) -> bool {
        if title.trim().is_empty() {
            return false;
        }

        if DENYLIST.iter().any(|word| title.contains(word)) {
            return false;
        }

        if WORD_PATTERN.is_match(title) {
            return false;
        }

        if title.contains(HUANYING) {
            if has_marker(title, "BIG5_MP4") || has_marker(title, "1280X720") {
                return false;
            }
            if !(has_marker(title, "GB_MP4") && has_marker(title, "1920X1080")) {
                return false;
            }
        }

        if title.contains(YOUHA) && title.contains("[CHT]") {
            return false;
        }

        !RANGE_PATTERN.is_match(title)
    }
}

/// Bracketed marker in either half-width or full-width brackets.
fn has_marker(title: &str, marker: &str) -> bool {
    title.contains(&format!("[{}]", marker)) || title.contains(&format!("【{}】", marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow(title: &str) -> bool {
        TitleFilter::new().allow(title)
    }

    #[test]
    fn test_rejects_denylisted_substrings() {
        assert!(!allow("[GroupX] Title 内封 [01]"));
        assert!(!allow("[GroupX] 繁體 Title [01]"));
        assert!(!allow("[GroupX] Title 合集"));
        assert!(!allow("[GroupX] Title [01][BIG5]"));
        assert!(!allow("[GroupX] Title [01][720p]"));
    }

    #[test]
    fn test_rejects_whole_words() {
        assert!(!allow("[GroupX] Title - 12 Fin [1080p]"));
        assert!(!allow("[GroupX] Title - 12 [1080p][mkv]"));
        assert!(allow("[GroupX] Final Title - 12 [1080p]"));
    }

    #[test]
    fn test_rejects_empty_title() {
        assert!(!allow(""));
        assert!(!allow("   "));
    }

    #[test]
    fn test_rejects_batch_ranges() {
        assert!(!allow("[GroupX] Title [01-12][1080p]"));
        assert!(!allow("[GroupX] Title (01-12)"));
        assert!(allow("[GroupX] Title [12][1080p]"));
    }

    #[test]
    fn test_huanying_variant_rules() {
        assert!(allow("[幻樱字幕组][示例动画][12][1080P][GB_MP4][1920X1080].mp4"));
        assert!(allow("【幻樱字幕组】【4月新番】【示例动画】【12】【GB_MP4】【1920X1080】"));
        assert!(!allow("【幻樱字幕组】【示例动画】【12】【BIG5_MP4】【1920X1080】"));
        assert!(!allow("【幻樱字幕组】【示例动画】【12】【GB_MP4】【1280X720】"));
        assert!(!allow("【幻樱字幕组】【示例动画】【12】【GB_MP4】"));
    }

    #[test]
    fn test_youha_rejects_cht() {
        assert!(!allow("[悠哈璃羽字幕社] 示例动画 [12] [CHT]"));
        assert!(allow("[悠哈璃羽字幕社] 示例动画 [12] [CHS]"));
    }

    #[test]
    fn test_allows_regular_release() {
        assert!(!allow(
            "[LoliHouse] Example Show - 05 [WebRip 1080p HEVC-10bit AAC][简繁内封字幕]"
        ));
        assert!(allow("[ANi] Example Show - 05 [1080P][Baha][WEB-DL][AAC AVC][CHT]"));
    }
}
