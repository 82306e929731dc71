//! Release ingestion
//!
//! Every feed item goes through the same stages:
//!
//! ```text
//! FeedItem ─▶ dedup ─▶ team lookup ─▶ parse ─▶ match show
//!                                                 │
//!                       ┌─────────────────────────┴──────────┐
//!                  known show                            new show
//!                       │                                    │
//!         download ─▶ publish to channel        draft ─▶ BGM.tv lookup
//!                       │                                    │
//!                refresh nav card                  publish for admin review
//! ```
//!
//! [`IngestionPipeline`] runs items through a [`ItemProcessor`] with a
//! bounded number of workers and a per-item timeout.

#[cfg(test)]
pub mod mocks;
mod navigation;
mod pipeline;
mod processor;
mod publish;
mod traits;

pub use navigation::NavPublisher;
pub use pipeline::{IngestionPipeline, PipelineStats};
pub use processor::{ProcessorTargets, ReleaseProcessor, anime_from_subject};
pub use publish::{DownloadOptions, PublishOutcome, ReleasePublisher};
pub use traits::{
    AnimeStore, IngestionError, ItemOutcome, ItemProcessor, Messenger, Result, SkipReason,
};
