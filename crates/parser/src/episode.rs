//! Episode identifiers extracted from release titles.
//!
//! An [`EpisodeToken`] is what ends up in a release's episode index and in
//! rendered link lists. Tokens survive a round trip through their display
//! form, so persisted episode strings can be turned back into tokens with
//! [`EpisodeToken::parse`] before ordering.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Sentinel rendered for releases whose episode could not be determined.
pub const UNKNOWN_EPISODE: &str = "未知";

/// Kind of a non-regular episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialKind {
    /// 剧场版 / Gekijouban / Movie
    Movie,
    /// 剧场总集篇
    CompilationMovie,
    /// 电影
    Film,
    /// SP / 特别篇 / Special
    Sp,
    /// 特别篇 with an explicit number
    SpecialEpisode,
    Ova,
    Oad,
    Extra,
    /// 番外
    Bangai,
    /// 特典
    Tokuten,
}

impl SpecialKind {
    /// Label used when rendering the token.
    pub fn label(&self) -> &'static str {
        match self {
            SpecialKind::Movie => "剧场版",
            SpecialKind::CompilationMovie => "剧场总集篇",
            SpecialKind::Film => "电影",
            SpecialKind::Sp => "SP",
            SpecialKind::SpecialEpisode => "特别篇",
            SpecialKind::Ova => "OVA",
            SpecialKind::Oad => "OAD",
            SpecialKind::Extra => "Extra",
            SpecialKind::Bangai => "番外",
            SpecialKind::Tokuten => "特典",
        }
    }

    /// Resolve a prefix such as `ova`, `SP` or `番外` (case-insensitive).
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        let kind = match prefix.to_ascii_lowercase().as_str() {
            "剧场版" | "劇場版" => SpecialKind::Movie,
            "剧场总集篇" | "劇場總集篇" => SpecialKind::CompilationMovie,
            "电影" | "電影" => SpecialKind::Film,
            "sp" => SpecialKind::Sp,
            "特别篇" | "特別篇" => SpecialKind::SpecialEpisode,
            "ova" => SpecialKind::Ova,
            "oad" => SpecialKind::Oad,
            "extra" => SpecialKind::Extra,
            "番外" => SpecialKind::Bangai,
            "特典" => SpecialKind::Tokuten,
            _ => return None,
        };
        Some(kind)
    }
}

/// A single episode identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EpisodeToken {
    /// Regular episode, e.g. `03` or `12v2`
    Numeric {
        number: u32,
        /// Digit count as written, used to keep zero padding
        width: usize,
        /// Revision suffix such as `v2`, empty when absent
        version: String,
    },
    /// OVA, SP, movies and other specials
    Special {
        kind: SpecialKind,
        number: Option<u32>,
    },
    /// Anything else, e.g. a half episode `48.5`
    Other(String),
}

static NUMERIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)((?i:v\d+))?$").expect("Invalid numeric episode pattern")
});

static NUMBERED_SPECIAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(SP|OVA|OAD|Extra|番外|特典|特别篇|特別篇)[\s\-:]?(\d{1,3})$")
        .expect("Invalid special episode pattern")
});

impl EpisodeToken {
    /// Build a numeric token from the digits and optional revision as written.
    pub fn numeric(digits: &str, version: Option<&str>) -> Option<Self> {
        let number = digits.parse().ok()?;
        Some(EpisodeToken::Numeric {
            number,
            width: digits.len(),
            version: version.unwrap_or_default().to_lowercase(),
        })
    }

    /// Parse a rendered episode string back into a token.
    ///
    /// Never fails: unrecognised text becomes [`EpisodeToken::Other`].
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        if let Some(caps) = NUMERIC_PATTERN.captures(raw) {
            let version = caps.get(2).map(|m| m.as_str());
            if let Some(token) = Self::numeric(&caps[1], version) {
                return token;
            }
        }

        if let Some(caps) = NUMBERED_SPECIAL_PATTERN.captures(raw) {
            if let (Some(kind), Ok(number)) = (SpecialKind::from_prefix(&caps[1]), caps[2].parse())
            {
                return EpisodeToken::Special {
                    kind,
                    number: Some(number),
                };
            }
        }

        match SpecialKind::from_prefix(raw) {
            Some(kind) => EpisodeToken::Special { kind, number: None },
            None => EpisodeToken::Other(raw.to_string()),
        }
    }

    /// Embedded episode number, if any.
    pub fn number(&self) -> Option<u32> {
        match self {
            EpisodeToken::Numeric { number, .. } => Some(*number),
            EpisodeToken::Special { number, .. } => *number,
            EpisodeToken::Other(_) => None,
        }
    }
}

impl fmt::Display for EpisodeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpisodeToken::Numeric {
                number,
                width,
                version,
            } => write!(f, "{:0width$}{}", number, version, width = *width),
            EpisodeToken::Special {
                kind,
                number: Some(n),
            } => write!(f, "{}{:02}", kind.label(), n),
            EpisodeToken::Special { kind, number: None } => f.write_str(kind.label()),
            EpisodeToken::Other(raw) => f.write_str(raw),
        }
    }
}

/// Episode information of one release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseEpisode {
    Single(EpisodeToken),
    /// Inclusive range expanded into individual episodes
    Batch(Vec<EpisodeToken>),
    Unknown,
}

impl ReleaseEpisode {
    /// Rendered labels, one per episode.
    pub fn labels(&self) -> Vec<String> {
        match self {
            ReleaseEpisode::Single(token) => vec![token.to_string()],
            ReleaseEpisode::Batch(tokens) if !tokens.is_empty() => {
                tokens.iter().map(ToString::to_string).collect()
            }
            _ => vec![UNKNOWN_EPISODE.to_string()],
        }
    }

    /// Label stored in the episode index. Batches are joined with `,`.
    pub fn index_label(&self) -> String {
        self.labels().join(",")
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ReleaseEpisode::Unknown)
    }
}

impl fmt::Display for ReleaseEpisode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.index_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_keeps_padding_and_version() {
        let token = EpisodeToken::numeric("03", Some("v2")).unwrap();
        assert_eq!(token.to_string(), "03v2");
        assert_eq!(token.number(), Some(3));

        let token = EpisodeToken::numeric("112", None).unwrap();
        assert_eq!(token.to_string(), "112");
    }

    #[test]
    fn test_parse_rendered_forms() {
        assert_eq!(
            EpisodeToken::parse("12v2"),
            EpisodeToken::Numeric {
                number: 12,
                width: 2,
                version: "v2".into()
            }
        );
        assert_eq!(
            EpisodeToken::parse("OVA02"),
            EpisodeToken::Special {
                kind: SpecialKind::Ova,
                number: Some(2)
            }
        );
        assert_eq!(
            EpisodeToken::parse("sp 3"),
            EpisodeToken::Special {
                kind: SpecialKind::Sp,
                number: Some(3)
            }
        );
        assert_eq!(
            EpisodeToken::parse("剧场版"),
            EpisodeToken::Special {
                kind: SpecialKind::Movie,
                number: None
            }
        );
        assert_eq!(EpisodeToken::parse("48.5"), EpisodeToken::Other("48.5".into()));
    }

    #[test]
    fn test_display_round_trip() {
        for raw in ["01", "12v2", "SP01", "特别篇03", "剧场总集篇", "电影", "未知"] {
            assert_eq!(EpisodeToken::parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn test_release_episode_labels() {
        let batch = ReleaseEpisode::Batch(vec![
            EpisodeToken::parse("01"),
            EpisodeToken::parse("02"),
        ]);
        assert_eq!(batch.labels(), vec!["01", "02"]);
        assert_eq!(batch.index_label(), "01,02");
        assert_eq!(ReleaseEpisode::Unknown.labels(), vec![UNKNOWN_EPISODE]);
        assert_eq!(ReleaseEpisode::Batch(Vec::new()).to_string(), UNKNOWN_EPISODE);
    }
}
