use serde::{Deserialize, Serialize};

use crate::classifier::classify_episode;
use crate::episode::ReleaseEpisode;
use crate::error::ParseError;
use crate::fansub::extract_fansub_groups;
use crate::rules::FansubRuleRegistry;
use crate::source::extract_source;

/// Structured release metadata parsed from a title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRelease {
    /// Fansub groups from the leading bracket
    pub groups: Vec<String>,
    /// Candidate show names, de-duplicated, in extraction order
    pub names: Vec<String>,
    /// Streaming platform, empty when unknown
    pub source: String,
    pub episode: ReleaseEpisode,
}

/// Release title parser
#[derive(Debug, Clone)]
pub struct TitleParser {
    registry: FansubRuleRegistry,
}

impl Default for TitleParser {
    fn default() -> Self {
        Self::new(FansubRuleRegistry::with_defaults())
    }
}

impl TitleParser {
    pub fn new(registry: FansubRuleRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FansubRuleRegistry {
        &self.registry
    }

    /// Parse a release title.
    ///
    /// `team` is the publishing team as reported by the feed (or the first
    /// fansub group when the feed reports none). It selects the naming
    /// rule; a missing or unknown team is an error.
    pub fn parse(&self, title: &str, team: Option<&str>) -> crate::Result<ParsedRelease> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ParseError::EmptyTitle);
        }

        let groups = extract_fansub_groups(title);
        if groups.is_empty() {
            return Err(ParseError::NoFansubGroup(title.to_string()));
        }

        let team = team.map(str::trim).unwrap_or_default();
        let Some((key, strategy)) = self.registry.resolve(team) else {
            return Err(ParseError::UnsupportedGroup(team.to_string()));
        };

        let mut names: Vec<String> = Vec::new();
        for name in strategy.extract_names(title) {
            let name = name.trim();
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }

        let episode = classify_episode(title);
        let source = extract_source(title);

        tracing::trace!(
            "[{}] Parsed '{}': names={:?}, episode={}, source={}",
            key,
            title,
            names,
            episode,
            source
        );

        Ok(ParsedRelease {
            groups,
            names,
            source,
            episode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser_with_group_x() -> TitleParser {
        let mut registry = FansubRuleRegistry::with_defaults();
        registry.register("GroupX", |_: &str| vec!["Example".to_string()]);
        TitleParser::new(registry)
    }

    #[test]
    fn test_versioned_episode() {
        let release = parser_with_group_x()
            .parse("[GroupX][12v2][1080p]", Some("GroupX"))
            .unwrap();
        assert_eq!(release.groups, vec!["GroupX"]);
        assert_eq!(release.names, vec!["Example"]);
        assert_eq!(release.episode.labels(), vec!["12v2"]);
    }

    #[test]
    fn test_batch_episode() {
        let release = parser_with_group_x()
            .parse("[GroupX] Example [01-03][1080p]", Some("GroupX"))
            .unwrap();
        assert_eq!(release.episode.labels(), vec!["01", "02", "03"]);
    }

    #[test]
    fn test_huanying_release() {
        let release = TitleParser::default()
            .parse(
                "[幻樱字幕组][示例动画][12][1080P][GB_MP4][1920X1080].mp4",
                Some("幻樱字幕组"),
            )
            .unwrap();
        assert_eq!(release.groups, vec!["幻樱字幕组"]);
        assert_eq!(release.names, vec!["示例动画"]);
        assert_eq!(release.episode.labels(), vec!["12"]);
        assert_eq!(release.source, "");
    }

    #[test]
    fn test_team_hint_matches_by_substring() {
        let release = TitleParser::default()
            .parse(
                "[北宇治字幕组] 示例动画 / Example [05][WebRip][1080p]",
                Some("北宇治字幕组 Kitauji Sub"),
            )
            .unwrap();
        assert_eq!(release.names, vec!["示例动画", "Example"]);
        assert_eq!(release.episode.labels(), vec!["05"]);
    }

    #[test]
    fn test_unsupported_group() {
        let err = TitleParser::default()
            .parse("[Unknown Raws] Example - 01", Some("Unknown Raws"))
            .unwrap_err();
        assert_eq!(err, ParseError::UnsupportedGroup("Unknown Raws".into()));
    }

    #[test]
    fn test_missing_team_hint() {
        let err = TitleParser::default()
            .parse("[ANi] Example - 01", None)
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedGroup(_)));
    }

    #[test]
    fn test_missing_group_bracket() {
        let err = TitleParser::default()
            .parse("Example - 01 [1080p]", Some("ANi"))
            .unwrap_err();
        assert!(matches!(err, ParseError::NoFansubGroup(_)));
    }

    #[test]
    fn test_empty_title() {
        assert_eq!(
            TitleParser::default().parse("  ", Some("ANi")),
            Err(ParseError::EmptyTitle)
        );
    }

    #[test]
    fn test_strategy_without_names_still_parses() {
        let release = TitleParser::default()
            .parse("[幻樱字幕组][12][GB_MP4][1920X1080]", Some("幻樱字幕组"))
            .unwrap();
        assert!(release.names.is_empty());
    }
}
