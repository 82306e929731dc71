use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use parking_lot::Mutex;
use rss::FeedItem;
use tokio::sync::oneshot;

use super::traits::{ItemOutcome, ItemProcessor};

/// Counters of one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub total: usize,
    pub published: usize,
    pub drafted: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Still running in the background when the run ended
    pub timed_out: usize,
}

impl PipelineStats {
    fn merge(&mut self, other: PipelineStats) {
        self.total += other.total;
        self.published += other.published;
        self.drafted += other.drafted;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.timed_out += other.timed_out;
    }

    fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Skipped(_) => self.skipped += 1,
            ItemOutcome::Drafted { .. } => self.drafted += 1,
            ItemOutcome::Published { .. } => self.published += 1,
        }
    }
}

/// Bounded worker pool over one shared FIFO queue
///
/// Every item runs in its own task. When an item exceeds the timeout the
/// worker stops waiting and moves on; the task keeps running and logs its
/// own outcome.
pub struct IngestionPipeline {
    processor: Arc<dyn ItemProcessor>,
    concurrency: usize,
    item_timeout: Duration,
}

impl IngestionPipeline {
    pub fn new(processor: Arc<dyn ItemProcessor>, concurrency: usize, item_timeout: Duration) -> Self {
        Self {
            processor,
            concurrency: concurrency.max(1),
            item_timeout,
        }
    }

    /// Process every item once. Returns when the queue is drained.
    pub async fn run(&self, items: Vec<FeedItem>) -> PipelineStats {
        if items.is_empty() {
            return PipelineStats::default();
        }
        tracing::debug!(
            "Processing {} items with {} workers",
            items.len(),
            self.concurrency
        );

        let queue = Arc::new(Mutex::new(VecDeque::from(items)));
        let workers = (0..self.concurrency).map(|id| {
            worker(
                id,
                Arc::clone(&queue),
                Arc::clone(&self.processor),
                self.item_timeout,
            )
        });

        let mut stats = PipelineStats::default();
        for worker_stats in join_all(workers).await {
            stats.merge(worker_stats);
        }
        stats
    }
}

async fn worker(
    id: usize,
    queue: Arc<Mutex<VecDeque<FeedItem>>>,
    processor: Arc<dyn ItemProcessor>,
    item_timeout: Duration,
) -> PipelineStats {
    let mut stats = PipelineStats::default();

    loop {
        let Some(item) = queue.lock().pop_front() else {
            break;
        };
        stats.total += 1;
        let title = item.title.clone();

        let (tx, rx) = oneshot::channel();
        let task_processor = Arc::clone(&processor);
        let task_title = title.clone();
        tokio::spawn(async move {
            let result = task_processor.process(item).await;
            // Receiver is gone once the worker gave up on this item
            if let Err(result) = tx.send(result) {
                match result {
                    Ok(outcome) => tracing::info!(
                        "[detached] '{}' finished after timeout: {:?}",
                        task_title,
                        outcome
                    ),
                    Err(e) => tracing::error!(
                        "[detached] '{}' failed after timeout: {}",
                        task_title,
                        e
                    ),
                }
            }
        });

        match tokio::time::timeout(item_timeout, rx).await {
            Ok(Ok(Ok(outcome))) => {
                match &outcome {
                    ItemOutcome::Skipped(reason) => {
                        tracing::debug!("[worker {}] Skipped '{}': {}", id, title, reason)
                    }
                    other => tracing::info!("[worker {}] '{}': {:?}", id, title, other),
                }
                stats.record(&outcome);
            }
            Ok(Ok(Err(e))) => {
                tracing::error!("[worker {}] Failed to process '{}': {}", id, title, e);
                stats.failed += 1;
            }
            Ok(Err(_)) => {
                tracing::error!("[worker {}] Task for '{}' ended without a result", id, title);
                stats.failed += 1;
            }
            Err(_) => {
                tracing::warn!(
                    "[worker {}] '{}' exceeded {:?}, continuing in background",
                    id,
                    title,
                    item_timeout
                );
                stats.timed_out += 1;
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::traits::{IngestionError, SkipReason};
    use async_trait::async_trait;
    use rss::FeedKind;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records calls; titles containing "slow" sleep, "fail" error.
    #[derive(Default)]
    struct RecordingProcessor {
        calls: Mutex<HashMap<String, usize>>,
        finished: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ItemProcessor for RecordingProcessor {
        async fn process(&self, item: FeedItem) -> crate::ingestion::Result<ItemOutcome> {
            *self.calls.lock().entry(item.title.clone()).or_default() += 1;
            if item.title.contains("slow") {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            self.finished.lock().push(item.title.clone());
            if item.title.contains("fail") {
                return Err(IngestionError::Store("boom".into()));
            }
            if item.title.contains("skip") {
                return Ok(ItemOutcome::Skipped(SkipReason::KnownTitle));
            }
            Ok(ItemOutcome::Published {
                anime_id: 1,
                episode: "01".into(),
            })
        }
    }

    fn items(titles: &[&str]) -> Vec<FeedItem> {
        titles
            .iter()
            .map(|t| FeedItem::new(FeedKind::Dmhy, *t, "d"))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_item_processed_exactly_once() {
        let processor = Arc::new(RecordingProcessor::default());
        let pipeline = IngestionPipeline::new(processor.clone(), 3, Duration::from_secs(60));

        let titles: Vec<String> = (0..20).map(|i| format!("item {}", i)).collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        let stats = pipeline.run(items(&refs)).await;

        assert_eq!(stats.total, 20);
        assert_eq!(stats.published, 20);
        let calls = processor.calls.lock();
        assert_eq!(calls.len(), 20);
        assert!(calls.values().all(|&n| n == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_item_does_not_block_others() {
        let processor = Arc::new(RecordingProcessor::default());
        let pipeline = IngestionPipeline::new(processor.clone(), 1, Duration::from_secs(60));

        let stats = pipeline
            .run(items(&["slow one", "fast a", "fast b"]))
            .await;

        assert_eq!(stats.timed_out, 1);
        assert_eq!(stats.published, 2);
        assert_eq!(*processor.finished.lock(), vec!["fast a", "fast b"]);

        // The detached task still completes on its own
        tokio::time::sleep(Duration::from_secs(3600)).await;
        tokio::task::yield_now().await;
        assert!(processor.finished.lock().contains(&"slow one".to_string()));
        assert_eq!(processor.calls.lock()["slow one"], 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_and_skips_are_counted() {
        let processor = Arc::new(RecordingProcessor::default());
        let pipeline = IngestionPipeline::new(processor, 0, Duration::from_secs(60));

        let stats = pipeline.run(items(&["a fail", "b skip", "c"])).await;
        assert_eq!(
            stats,
            PipelineStats {
                total: 3,
                published: 1,
                drafted: 0,
                skipped: 1,
                failed: 1,
                timed_out: 0,
            }
        );
    }

    /// Tracks how many items are being processed at once.
    #[derive(Default)]
    struct GaugeProcessor {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ItemProcessor for GaugeProcessor {
        async fn process(&self, _item: FeedItem) -> crate::ingestion::Result<ItemOutcome> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(ItemOutcome::Skipped(SkipReason::KnownTitle))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_count_bounds_concurrency() {
        let processor = Arc::new(GaugeProcessor::default());
        let pipeline = IngestionPipeline::new(processor.clone(), 3, Duration::from_secs(60));

        let titles: Vec<String> = (0..10).map(|i| format!("item {}", i)).collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        let stats = pipeline.run(items(&refs)).await;

        assert_eq!(stats.skipped, 10);
        assert_eq!(processor.peak.load(Ordering::SeqCst), 3);
        assert_eq!(processor.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_queue() {
        let pipeline = IngestionPipeline::new(
            Arc::new(RecordingProcessor::default()),
            3,
            Duration::from_secs(1),
        );
        assert_eq!(pipeline.run(Vec::new()).await, PipelineStats::default());
    }
}
