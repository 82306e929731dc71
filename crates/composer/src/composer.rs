use std::sync::LazyLock;

use chrono::{Duration, NaiveDate, Utc};
use regex::Regex;

use crate::budget::{ComposerBudgets, SizeBudget};
use crate::formatter::{anime_date, format_sections, format_tags, quote};
use crate::measure::TextMeasurer;
use crate::models::AnimeRecord;

/// Summary length of the first card attempt
const SUMMARY_MAX: usize = 300;

/// Shorter summaries tried, in order, while the card is over budget
const SUMMARY_STEPS: [usize; 5] = [250, 200, 150, 120, 100];

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\r?\n){2,}").expect("Invalid blank line pattern"));

enum Resources<'a> {
    Sections(&'a [String]),
    Nav(&'a str),
    None,
}

/// Builds the navigation card of a show and its continuation pages
///
/// # Example
///
/// ```
/// use composer::{AnimeRecord, MarkdownMeasurer, PaginatedComposer};
///
/// # tokio_test_block_on(async {
/// let anime = AnimeRecord {
///     id: 1,
///     name: "Example".into(),
///     ..Default::default()
/// };
/// let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let pages = PaginatedComposer::default()
///     .compose_at(&MarkdownMeasurer, &anime, date)
///     .await
///     .unwrap();
/// assert_eq!(pages.len(), 1);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct PaginatedComposer {
    budgets: ComposerBudgets,
}

impl PaginatedComposer {
    pub fn new(budgets: ComposerBudgets) -> Self {
        Self { budgets }
    }

    pub fn budgets(&self) -> &ComposerBudgets {
        &self.budgets
    }

    /// Compose with today's date in UTC+8.
    pub async fn compose<M: TextMeasurer + ?Sized>(
        &self,
        measurer: &M,
        anime: &AnimeRecord,
    ) -> crate::Result<Vec<String>> {
        let today = (Utc::now() + Duration::hours(8)).date_naive();
        self.compose_at(measurer, anime, today).await
    }

    /// Index 0 is the card, every later index is a continuation page.
    pub async fn compose_at<M: TextMeasurer + ?Sized>(
        &self,
        measurer: &M,
        anime: &AnimeRecord,
        date: NaiveDate,
    ) -> crate::Result<Vec<String>> {
        let sections = format_sections(&anime.episode_index);
        let pages = self.pack_pages(measurer, anime, &sections).await?;
        let nav = nav_line(anime, pages.len());

        let resources = if sections.is_empty() {
            Resources::None
        } else {
            Resources::Nav(&nav)
        };

        let mut summary_len = SUMMARY_MAX;
        let mut card = render_card(anime, date, summary_len, &resources);
        let mut fits = self.fits(measurer, &card, self.budgets.card).await?;
        for step in SUMMARY_STEPS {
            if fits {
                break;
            }
            summary_len = step;
            card = render_card(anime, date, summary_len, &resources);
            fits = self.fits(measurer, &card, self.budgets.card).await?;
        }
        if !fits {
            tracing::debug!(
                "[{}] Card still over budget at summary length {}",
                anime.id,
                summary_len
            );
        }

        if sections.is_empty() {
            return Ok(vec![card]);
        }

        let full = render_card(anime, date, summary_len, &Resources::Sections(&sections));
        if self.fits(measurer, &full, self.budgets.card).await? {
            return Ok(vec![full]);
        }

        let mut messages = Vec::with_capacity(pages.len() + 1);
        messages.push(card);
        messages.extend(pages);
        Ok(messages)
    }

    async fn fits<M: TextMeasurer + ?Sized>(
        &self,
        measurer: &M,
        text: &str,
        budget: SizeBudget,
    ) -> crate::Result<bool> {
        Ok(budget.fits(measurer.measure(text).await?))
    }

    /// Greedy packing of sections under the page budget.
    async fn pack_pages<M: TextMeasurer + ?Sized>(
        &self,
        measurer: &M,
        anime: &AnimeRecord,
        sections: &[String],
    ) -> crate::Result<Vec<String>> {
        let header = format!("动漫: {}\n>\n资源:\n", anime.display_name());
        let page_text = |body: &[&str]| format!("{}{}", header, body.join("\n")).trim().to_string();
        let budget = self.budgets.page;

        let mut pages = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for section in sections.iter().map(String::as_str) {
            let mut candidate = current.clone();
            candidate.push(section);
            if self.fits(measurer, &page_text(&candidate), budget).await? {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                pages.push(page_text(&current));
                current.clear();
                if self.fits(measurer, &page_text(&[section]), budget).await? {
                    current.push(section);
                    continue;
                }
            }

            tracing::debug!("[{}] Section exceeds the page budget on its own", anime.id);
            pages.push(page_text(&[section]));
        }
        if !current.is_empty() {
            pages.push(page_text(&current));
        }
        Ok(pages)
    }
}

/// `[第1页](link) 第2页 ...`
fn nav_line(anime: &AnimeRecord, page_count: usize) -> String {
    (1..=page_count)
        .map(|page| {
            match anime.nav_pages.get(&page).and_then(|m| m.link.as_deref()) {
                Some(link) => format!("[第{}页]({})", page, link),
                None => format!("第{}页", page),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_card(anime: &AnimeRecord, date: NaiveDate, summary_len: usize, resources: &Resources<'_>) -> String {
    let mut title = Vec::new();
    if let Some(month) = anime_date(anime.airing_start.as_deref()) {
        title.push(format!("#{}", month));
    }
    if anime.nsfw {
        title.push("#NSFW".to_string());
    }
    title.push(if anime.name.is_empty() {
        anime.name_cn.clone()
    } else {
        anime.name.clone()
    });

    let unknown = "未知";
    let score = anime
        .score
        .map(|s| format!("{:.1}", s))
        .unwrap_or_else(|| unknown.to_string());

    let mut card = title.join(" ");
    card.push_str(&format!("\n> 中文名称: {}", anime.name_cn));
    card.push_str(&format!(
        "\n> 本季话数: {}",
        anime.episode_count.as_deref().unwrap_or(unknown)
    ));
    card.push_str(&format!(
        "\n> 放送开始: {}",
        anime.airing_start.as_deref().unwrap_or(unknown)
    ));
    card.push_str(&format!(
        "\n> 放送星期: {}",
        anime.airing_day.as_deref().unwrap_or(unknown)
    ));
    card.push_str(&format!(
        "\n> 动漫评分: [{}](https://bgm.tv/subject/{}/stats)({})",
        score,
        anime.id,
        date.format("%Y-%m-%d")
    ));

    let summary = trim_summary(&anime.summary, summary_len, anime.id);
    if !summary.is_empty() {
        card.push_str("\n\n介绍:\n");
        card.push_str(&quote(&summary));
        card.push_str("||");
    }

    match resources {
        Resources::Sections(sections) => {
            card.push_str("\n\n资源:\n");
            card.push_str(&sections.join("\n"));
        }
        Resources::Nav(nav) => {
            card.push_str("\n\n资源:\n> ");
            card.push_str(nav);
        }
        Resources::None => {}
    }

    let tags = format_tags(&anime.tags);
    if !tags.is_empty() {
        card.push_str("\n\n标签: \n> ");
        card.push_str(&tags);
        card.push_str("||");
    }
    card
}

/// Normalise line breaks and cut to `max_len` characters with a detail link.
fn trim_summary(summary: &str, max_len: usize, id: i64) -> String {
    let summary = summary.replace("\\n", "\n");
    let summary = BLANK_LINES.replace_all(&summary, "\n");
    let summary = summary.trim();
    if summary.chars().count() <= max_len {
        return summary.to_string();
    }
    let cut: String = summary.chars().take(max_len).collect();
    format!("{}[...详细](https://bgm.tv/subject/{})", cut.trim_end(), id)
}
