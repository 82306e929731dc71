use thiserror::Error;

/// Reasons a release title cannot be turned into a [`crate::ParsedRelease`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Empty title")]
    EmptyTitle,

    #[error("No fansub group bracket in title: {0}")]
    NoFansubGroup(String),

    #[error("No naming rule for fansub group '{0}'")]
    UnsupportedGroup(String),
}
