//! Rendered-size measurement.
//!
//! The messaging surface limits a message by its rendered text length and
//! by the number of formatting entities. Only the surface itself knows the
//! exact numbers, so composition asks a [`TextMeasurer`].

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::error::ComposeError;

/// Rendered size of a markdown message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Measurement {
    /// Length of the visible text in UTF-16 code units
    pub text_len: usize,
    pub entity_count: usize,
}

#[async_trait]
pub trait TextMeasurer: Send + Sync {
    /// Parse `text` as markdown and report its rendered size.
    /// Text that renders to nothing is an error.
    async fn measure(&self, text: &str) -> crate::Result<Measurement>;
}

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]*)\]\(([^)\s]*)\)").expect("Invalid link pattern")
});

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("Invalid bold pattern"));

static SPOILER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|\|(.+?)\|\|").expect("Invalid spoiler pattern"));

static CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("Invalid code pattern"));

static HASHTAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w#])#[\p{L}\p{N}_]+").expect("Invalid hashtag pattern")
});

/// Local approximation of the messaging surface's markdown parser
///
/// Recognises links, bold, spoilers, inline code, `>` quote blocks and
/// hashtags. Good enough for offline composition and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownMeasurer;

impl MarkdownMeasurer {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous measurement.
    pub fn measure_text(&self, text: &str) -> crate::Result<Measurement> {
        let mut entity_count = 0;
        let mut lines = Vec::new();
        for block in quote_blocks(text) {
            match block {
                Block::Plain(line) => lines.push(line),
                Block::Quote { lines: quoted, .. } => {
                    entity_count += 1;
                    lines.extend(quoted);
                }
            }
        }
        let mut plain = lines.join("\n");

        for pattern in [&*LINK, &*BOLD, &*SPOILER, &*CODE] {
            entity_count += pattern.find_iter(&plain).count();
            plain = pattern.replace_all(&plain, "$1").into_owned();
        }
        entity_count += HASHTAG.find_iter(&plain).count();

        let plain = plain.trim();
        if plain.is_empty() {
            return Err(ComposeError::Measure("text renders to nothing".into()));
        }

        Ok(Measurement {
            text_len: plain.encode_utf16().count(),
            entity_count,
        })
    }
}

/// Convert the markdown subset understood by [`MarkdownMeasurer`] to the
/// HTML flavour accepted by the Telegram Bot API.
pub fn markdown_to_html(text: &str) -> String {
    let parts: Vec<String> = quote_blocks(text)
        .into_iter()
        .map(|block| match block {
            Block::Plain(line) => escape_html(line),
            Block::Quote { lines, expandable } => {
                let body: Vec<String> = lines.iter().map(|line| escape_html(line)).collect();
                let open = if expandable {
                    "<blockquote expandable>"
                } else {
                    "<blockquote>"
                };
                format!("{}{}</blockquote>", open, body.join("\n"))
            }
        })
        .collect();
    let html = parts.join("\n");

    let html = LINK.replace_all(&html, r#"<a href="$2">$1</a>"#);
    let html = BOLD.replace_all(&html, "<b>$1</b>");
    let html = SPOILER.replace_all(&html, "<tg-spoiler>$1</tg-spoiler>");
    CODE.replace_all(&html, "<code>$1</code>").into_owned()
}

enum Block<'a> {
    Plain(&'a str),
    /// Consecutive `>` lines, markers removed. A block whose last line ends
    /// with an unpaired `||` is collapsed by default.
    Quote { lines: Vec<&'a str>, expandable: bool },
}

fn quote_blocks(text: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut quoted: Vec<&str> = Vec::new();
    for line in text.split('\n') {
        match line.strip_prefix('>') {
            Some(rest) => quoted.push(rest.strip_prefix(' ').unwrap_or(rest)),
            None => {
                if !quoted.is_empty() {
                    blocks.push(close_quote(std::mem::take(&mut quoted)));
                }
                blocks.push(Block::Plain(line));
            }
        }
    }
    if !quoted.is_empty() {
        blocks.push(close_quote(quoted));
    }
    blocks
}

fn close_quote(mut lines: Vec<&str>) -> Block<'_> {
    let mut expandable = false;
    if let Some(last) = lines.pop() {
        let unpaired = last.matches("||").count() % 2 == 1;
        match last.strip_suffix("||") {
            Some(rest) if unpaired => {
                lines.push(rest);
                expandable = true;
            }
            _ => lines.push(last),
        }
    }
    Block::Quote { lines, expandable }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[async_trait]
impl TextMeasurer for MarkdownMeasurer {
    async fn measure(&self, text: &str) -> crate::Result<Measurement> {
        self.measure_text(text)
    }
}
