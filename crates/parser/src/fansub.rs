//! Fansub group extraction from the leading title bracket.

use regex::Regex;
use std::sync::LazyLock;

/// Leading bracket, half-width or full-width
static LEADING_BRACKET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\[([^\]]+)\]|【([^】]+)】)").expect("Invalid leading bracket pattern")
});

/// Separators between collaborating groups
static GROUP_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[&/|｜、·]\s*").expect("Invalid separator pattern"));

/// Extract the fansub groups named in the title's leading bracket.
///
/// `[A&B] Title` and `【A/B】Title` both yield `["A", "B"]`. Returns an
/// empty list when the title has no leading bracket.
pub fn extract_fansub_groups(title: &str) -> Vec<String> {
    let Some(caps) = LEADING_BRACKET.captures(title.trim_start()) else {
        return Vec::new();
    };

    let Some(inner) = caps.get(1).or_else(|| caps.get(2)) else {
        return Vec::new();
    };

    GROUP_SEPARATOR
        .split(inner.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
