//! Total order over episode tokens.
//!
//! Regular episodes come first by number, then revision. A numbered
//! special sits right after the regular episode with the same number.
//! Specials without a number follow every numbered token, and anything
//! unrecognised goes last. Tokens that compare equal keep their relative
//! position under [`sort_episodes`].

use std::cmp::Ordering;

use crate::episode::EpisodeToken;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey<'a> {
    class: u8,
    number: u32,
    tie: u8,
    version: &'a str,
}

fn sort_key(token: &EpisodeToken) -> SortKey<'_> {
    match token {
        EpisodeToken::Numeric {
            number, version, ..
        } => SortKey {
            class: 0,
            number: *number,
            tie: 0,
            version,
        },
        EpisodeToken::Special {
            number: Some(number),
            ..
        } => SortKey {
            class: 0,
            number: *number,
            tie: 1,
            version: "",
        },
        EpisodeToken::Special { number: None, .. } => SortKey {
            class: 1,
            number: 0,
            tie: 0,
            version: "",
        },
        EpisodeToken::Other(_) => SortKey {
            class: 2,
            number: 0,
            tie: 0,
            version: "",
        },
    }
}

/// Compare two episode tokens.
pub fn compare_episodes(a: &EpisodeToken, b: &EpisodeToken) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

/// Stable in-place sort by [`compare_episodes`].
pub fn sort_episodes(tokens: &mut [EpisodeToken]) {
    tokens.sort_by(compare_episodes);
}
