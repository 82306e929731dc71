//! Message composition for release announcements
//!
//! A show's navigation card lists every fansub group's published episodes.
//! When the list outgrows the card's size limit, it moves into
//! continuation pages and the card links to them instead:
//!
//! ```text
//! card (caption, 1024 chars)       page 1 (text, 4096 chars)
//! ┌──────────────────────────┐     ┌──────────────────────────┐
//! │ title / info / summary   │     │ 动漫: name               │
//! │ 资源: [第1页] [第2页] ────┼────▶│ [#GroupA] 01 | 02 | ...  │
//! │ 标签                      │     │ [#GroupB] 01 | ...       │
//! └──────────────────────────┘     └──────────────────────────┘
//! ```
//!
//! Sizes are measured by a [`TextMeasurer`], usually the messaging client.

mod budget;
mod composer;
mod error;
mod formatter;
mod measure;
mod models;

pub use budget::{ComposerBudgets, SizeBudget};
pub use composer::PaginatedComposer;
pub use error::ComposeError;
pub use formatter::{
    anime_date, format_section, format_sections, format_tags, quote, release_caption, safe_tag,
};
pub use measure::{MarkdownMeasurer, Measurement, TextMeasurer, markdown_to_html};
pub use models::{AnimeRecord, BtEntry, MessageRef, ResourceGroup};

pub type Result<T> = std::result::Result<T, ComposeError>;
