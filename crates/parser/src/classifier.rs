//! Episode classification
//!
//! Extracts the episode a release carries from its free-text title by
//! trying a fixed list of layouts, most specific first:
//!
//! 1. batch ranges such as `[01-12]` or `(01v2-03)`
//! 2. single-episode layouts (`[12v2]`, `[03_卢恩城]`, `【14】`, ` - 05 `, `第5话`, ...)
//! 3. specials: movies, `SP`, `OVA2`, half episodes like `48.5`
//!
//! The first layout that matches decides the result.

use regex::Regex;
use std::sync::LazyLock;

use crate::episode::{EpisodeToken, ReleaseEpisode, SpecialKind};

/// Batch range with optionally versioned endpoints
static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\[(\d{1,3}(?:v\d+)?)-(\d{1,3}(?:v\d+)?)\]|\((\d{1,3}(?:v\d+)?)-(\d{1,3}(?:v\d+)?)\)",
    )
    .expect("Invalid range pattern")
});

static ENDPOINT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3})(v\d+)?$").expect("Invalid endpoint pattern"));

/// Single-episode layouts in priority order. Group 1 holds the episode.
static SINGLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // last bracket, versioned: [12v2]
        r"\[(\d{1,3}v\d+)\][^\[]*$",
        // [03_卢恩城]
        r"\[(\d{1,3})_",
        // [03 - 总第13]
        r"\[(\d{1,3})\s*-\s*总第\d+",
        // 【14v2】
        r"【(\d{1,3}v\d+)】",
        // - 02v2
        r"\s-\s(\d{1,3}v\d+)(?:\s|$|\(|\[|【)",
        // last bracket: [12]
        r"\[(\d{1,3})\][^\[]*$",
        // 【14】
        r"【(\d{1,3})】",
        // - 02
        r"\s-\s(\d{1,3})(?:\s|$|\(|\[|【)",
        // 第5话, EP05集
        r"(?i)(?:第|EP)(\d{1,3}(?:v\d+)?)(?:话|集|話)",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("Invalid episode pattern"))
    .collect()
});

static SQUARE_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").expect("Invalid bracket pattern"));

static FULLWIDTH_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"【([^】]+)】").expect("Invalid bracket pattern"));

static LONE_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}(?:v\d+)?$").expect("Invalid lone episode pattern"));

static MOVIE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)剧场版|劇場版|剧场总集篇|劇場總集篇|Gekijouban|Eiga|Movie")
        .expect("Invalid movie pattern")
});

static COMPILATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"剧场总集篇|劇場總集篇").expect("Invalid compilation pattern"));

static FILM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"电影|電影").expect("Invalid film pattern"));

static SP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)特别篇|特別篇|\bSpecial\b|\bSP\b").expect("Invalid SP pattern")
});

static NUMBERED_SPECIAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(OVA|OAD|SP|Extra|番外|特典)[\s\-:]?(\d{1,3})")
        .expect("Invalid numbered special pattern")
});

/// Half episodes: 48.5
static DECIMAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s\-\[]?(\d{1,3}\.\d)[\s\)\]]").expect("Invalid decimal pattern")
});

/// Classify the episode carried by a release title.
pub fn classify_episode(title: &str) -> ReleaseEpisode {
    if let Some(batch) = batch_range(title) {
        return batch;
    }

    if let Some(token) = single_episode(title) {
        return ReleaseEpisode::Single(token);
    }

    match special_episode(title) {
        Some(token) => ReleaseEpisode::Single(token),
        None => ReleaseEpisode::Unknown,
    }
}

fn batch_range(title: &str) -> Option<ReleaseEpisode> {
    let caps = RANGE_PATTERN.captures(title)?;
    let start = caps.get(1).or_else(|| caps.get(3))?.as_str();
    let end = caps.get(2).or_else(|| caps.get(4))?.as_str();

    let start_caps = ENDPOINT_PATTERN.captures(start)?;
    let end_caps = ENDPOINT_PATTERN.captures(end)?;

    let start_digits = &start_caps[1];
    let first: u32 = start_digits.parse().ok()?;
    let last: u32 = end_caps[1].parse().ok()?;
    if first > last {
        tracing::debug!("Inverted episode range {}-{} in: {}", start, end, title);
        return Some(ReleaseEpisode::Unknown);
    }

    let width = start_digits.len();
    let start_version = start_caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    let end_version = end_caps.get(2).map(|m| m.as_str()).unwrap_or_default();

    let tokens = (first..=last)
        .map(|number| {
            let version = if number == first && !start_version.is_empty() {
                start_version
            } else if number == last && !end_version.is_empty() {
                end_version
            } else {
                ""
            };
            EpisodeToken::Numeric {
                number,
                width,
                version: version.to_string(),
            }
        })
        .collect();

    Some(ReleaseEpisode::Batch(tokens))
}

fn single_episode(title: &str) -> Option<EpisodeToken> {
    let matched = SINGLE_PATTERNS
        .iter()
        .find_map(|p| p.captures(title).and_then(|c| c.get(1)))
        .map(|m| m.as_str().to_string())
        .or_else(|| lone_bracket_number(title))?;

    Some(EpisodeToken::parse(&matched))
}

/// Last resort: a bracket holding nothing but an episode number, scanning
/// square brackets from the end, then full-width ones. The leading group
/// bracket is never considered.
fn lone_bracket_number(title: &str) -> Option<String> {
    let offset = title.len() - title.trim_start().len();

    [&*SQUARE_BRACKET, &*FULLWIDTH_BRACKET]
        .into_iter()
        .find_map(|pattern| {
            let found: Vec<_> = pattern
                .captures_iter(title)
                .filter(|c| c.get(0).is_some_and(|m| m.start() != offset))
                .filter_map(|c| c.get(1))
                .collect();
            found
                .into_iter()
                .rev()
                .map(|m| m.as_str().trim())
                .find(|content| LONE_EPISODE.is_match(content))
                .map(ToString::to_string)
        })
}

fn special_episode(title: &str) -> Option<EpisodeToken> {
    if MOVIE_PATTERN.is_match(title) {
        let kind = if COMPILATION_PATTERN.is_match(title) {
            SpecialKind::CompilationMovie
        } else {
            SpecialKind::Movie
        };
        return Some(EpisodeToken::Special { kind, number: None });
    }

    if FILM_PATTERN.is_match(title) {
        return Some(EpisodeToken::Special {
            kind: SpecialKind::Film,
            number: None,
        });
    }

    if SP_PATTERN.is_match(title) {
        return Some(EpisodeToken::Special {
            kind: SpecialKind::Sp,
            number: None,
        });
    }

    if let Some(caps) = NUMBERED_SPECIAL_PATTERN.captures(title) {
        let kind = SpecialKind::from_prefix(&caps[1])?;
        let number = caps[2].parse().ok()?;
        return Some(EpisodeToken::Special {
            kind,
            number: Some(number),
        });
    }

    DECIMAL_PATTERN
        .captures(title)
        .map(|caps| EpisodeToken::Other(caps[1].to_string()))
}
