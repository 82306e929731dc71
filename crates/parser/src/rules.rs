//! Per-group name extraction rules.
//!
//! Every fansub group lays its titles out in its own way. A
//! [`FansubRuleRegistry`] maps group keys to the [`NameStrategy`] that knows
//! the layout. Groups without a registered strategy are unsupported; there
//! is no generic fallback.
//!
//! # Example
//!
//! ```
//! use parser::FansubRuleRegistry;
//!
//! let mut registry = FansubRuleRegistry::with_defaults();
//! registry.register("MyGroup", |title: &str| vec![title.to_string()]);
//!
//! assert!(registry.resolve("mygroup").is_some());
//! assert!(registry.resolve("Unknown Raws").is_none());
//! ```

use regex::Regex;
use std::sync::{Arc, LazyLock};

/// Extracts candidate show names from a release title.
pub trait NameStrategy: Send + Sync {
    fn extract_names(&self, title: &str) -> Vec<String>;
}

impl<F> NameStrategy for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn extract_names(&self, title: &str) -> Vec<String> {
        self(title)
    }
}

/// Ordered lookup table from group key to naming strategy
#[derive(Clone, Default)]
pub struct FansubRuleRegistry {
    rules: Vec<(String, Arc<dyn NameStrategy>)>,
}

impl FansubRuleRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in group layouts.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for key in ["ANi", "LoliHouse", "Lilith-Raws", "SweetSub", "NC-Raws"] {
            registry.register(key, dash_separated);
        }
        for key in ["北宇治字幕组", "桜都字幕组", "千夏字幕组", "沸班亚马制作组"] {
            registry.register(key, slash_before_bracket);
        }
        for key in ["幻樱字幕组", "喵萌奶茶屋", "悠哈璃羽字幕社", "澄空学园", "华盟字幕社"] {
            registry.register(key, bracket_after_group);
        }
        registry
    }

    /// Append a rule. Earlier registrations win on overlapping keys.
    pub fn register(&mut self, key: impl Into<String>, strategy: impl NameStrategy + 'static) {
        self.rules.push((key.into(), Arc::new(strategy)));
    }

    /// Find the strategy whose key occurs (case-insensitively) in `team`.
    pub fn resolve(&self, team: &str) -> Option<(&str, Arc<dyn NameStrategy>)> {
        if team.trim().is_empty() {
            return None;
        }
        let team = team.to_lowercase();
        self.rules
            .iter()
            .find(|(key, _)| team.contains(&key.to_lowercase()))
            .map(|(key, strategy)| (key.as_str(), Arc::clone(strategy)))
    }

    /// Registered keys in lookup order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(key, _)| key.as_str())
    }
}

impl std::fmt::Debug for FansubRuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FansubRuleRegistry")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

static LEADING_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\[[^\]]*\]|【[^】]*】)\s*").expect("Invalid leading group pattern")
});

/// Decorations like ★04月新番★ or ★10月新番 between group and name
static DECORATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*★[^★\[【]*★?\s*").expect("Invalid decoration pattern")
});

static DASH_EPISODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s+)-\s+\d{1,3}(?:v\d+)?(?:\s|$|\(|\[|【)").expect("Invalid dash episode pattern")
});

static BRACKET_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]|【([^】]+)】").expect("Invalid bracket segment pattern")
});

/// Bracket contents that never hold a show name
static NON_NAME_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:\d{1,2}月新番|新番|\d{1,3}(?:v\d+)?|\d{3,4}p|\d{3,4}x\d{3,4}|GB|BIG5|CHS|CHT|GB_MP4|BIG5_MP4|MP4|MKV|WebRip|WEB-DL|HEVC|AVC|AAC|简体|繁体|简日|繁日|简繁|简日双语|繁日双语|字幕社招人内详)$",
    )
    .expect("Invalid non-name pattern")
});

/// `[Group] Name / Alias - 12 [1080p]`
pub fn dash_separated(title: &str) -> Vec<String> {
    let rest = strip_group(title);
    let end = DASH_EPISODE
        .find(rest)
        .map(|m| m.start())
        .or_else(|| rest.find(['[', '【']))
        .unwrap_or(rest.len());
    split_names(&rest[..end], &['/', '|'])
}

/// `[Group] 中文名 / Romaji [12][1080p]`
pub fn slash_before_bracket(title: &str) -> Vec<String> {
    let rest = strip_group(title);
    let end = rest.find(['[', '【']).unwrap_or(rest.len());
    let head = &rest[..end];
    let head = DASH_EPISODE
        .find(head)
        .map(|m| &head[..m.start()])
        .unwrap_or(head);
    split_names(head, &['/'])
}

/// `【Group】[中文名_Romaji][12][GB_MP4]`
pub fn bracket_after_group(title: &str) -> Vec<String> {
    let rest = strip_group(title);
    BRACKET_SEGMENT
        .captures_iter(rest)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str().trim())
        .find(|segment| !segment.is_empty() && !NON_NAME_SEGMENT.is_match(segment))
        .map(|segment| split_names(segment, &['/', '_']))
        .unwrap_or_default()
}

fn strip_group(title: &str) -> &str {
    let rest = match LEADING_GROUP.find(title) {
        Some(m) => &title[m.end()..],
        None => title,
    };
    match DECORATION.find(rest) {
        Some(m) => &rest[m.end()..],
        None => rest,
    }
}

fn split_names(segment: &str, separators: &[char]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in segment.split(separators).map(str::trim) {
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
