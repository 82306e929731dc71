use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Timelike, Utc};
use rss::FeedSource;
use tokio::task::JoinHandle;

use crate::ingestion::{IngestionPipeline, PipelineStats};

/// Offset of the release schedule's local time from UTC
const LOCAL_OFFSET_HOURS: i64 = 8;

/// Local hours where the polling interval changes
const SWITCH_HOURS: [u32; 5] = [2, 11, 14, 18, 21];

/// Delay before the next poll, by local (UTC+8) time of day.
///
/// Evening airings get the shortest interval. When the next switch hour
/// comes before the interval elapses, the poll lands one second past it.
pub fn poll_delay(now: DateTime<Utc>) -> Duration {
    let local = now + chrono::Duration::hours(LOCAL_OFFSET_HOURS);
    let hour = local.hour();

    let interval = match hour {
        21..=23 | 0..2 => 60,
        18..21 => 3 * 60,
        11..14 => 5 * 60,
        _ => 15 * 60,
    };

    let elapsed = u64::from(local.num_seconds_from_midnight());
    let next_switch = SWITCH_HOURS
        .iter()
        .map(|h| u64::from(*h) * 3600)
        .find(|s| *s > elapsed)
        .unwrap_or(u64::from(SWITCH_HOURS[0]) * 3600 + 86400);
    let remaining = next_switch - elapsed;

    if remaining < interval {
        Duration::from_secs(remaining + 1)
    } else {
        Duration::from_secs(interval)
    }
}

/// Endless poll loop: fetch feeds, run the pipeline, sleep
pub struct PollScheduler {
    feeds: Arc<dyn FeedSource>,
    pipeline: Arc<IngestionPipeline>,
}

impl PollScheduler {
    pub fn new(feeds: Arc<dyn FeedSource>, pipeline: Arc<IngestionPipeline>) -> Self {
        Self { feeds, pipeline }
    }

    /// One poll. Feed failures are logged and yield empty stats.
    pub async fn run_once(&self) -> PipelineStats {
        let items = match self.feeds.fetch_items().await {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("[poll] Failed to fetch feeds: {}", e);
                return PipelineStats::default();
            }
        };

        let stats = self.pipeline.run(items).await;
        if stats.total > 0 {
            tracing::info!(
                "[poll] {} items: {} published, {} drafted, {} skipped, {} failed, {} timed out",
                stats.total,
                stats.published,
                stats.drafted,
                stats.skipped,
                stats.failed,
                stats.timed_out
            );
        }
        stats
    }

    pub async fn run_forever(self) {
        tracing::info!("[poll] Scheduler started");
        loop {
            self.run_once().await;
            let delay = poll_delay(Utc::now());
            tracing::debug!("[poll] Next poll in {}s", delay.as_secs());
            tokio::time::sleep(delay).await;
        }
    }

    /// Run the loop on its own task.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(self.run_forever())
    }
}
