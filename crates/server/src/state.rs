use std::sync::Arc;

use composer::PaginatedComposer;
use downloader::DownloaderClient;
use metadata::HttpProvider;
use parser::TitleParser;
use reqwest::Client;
use rss::RssClient;

use crate::config::Config;
use crate::ingestion::{
    DownloadOptions, IngestionPipeline, NavPublisher, ProcessorTargets, ReleaseProcessor,
    ReleasePublisher,
};
use crate::models::{ChatTarget, Settings};
use crate::services::{PollScheduler, SettingsService};
use crate::store::JsonFileStore;
use crate::telegram::TelegramMessenger;

/// Long-lived services of the watcher, wired from settings
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub settings: Arc<SettingsService>,
    pub http_client: Client,
    pub store: Arc<JsonFileStore>,
    pub messenger: Arc<TelegramMessenger>,
    pub feeds: Arc<RssClient>,
    pub pipeline: Arc<IngestionPipeline>,
}

impl AppState {
    pub async fn new(
        config: Config,
        settings: SettingsService,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let current = settings.get().await;
        let http_client = Client::new();

        let store = Arc::new(JsonFileStore::open(config.store_path()).await?);
        let messenger = Arc::new(TelegramMessenger::with_client(
            http_client.clone(),
            &current.telegram,
        ));
        let metadata = Arc::new(HttpProvider::with_client(http_client.clone()));
        let downloader = Arc::new(DownloaderClient::from_config(
            current
                .downloader
                .to_config(current.pipeline.item_timeout()),
        )?);
        let feeds = Arc::new(RssClient::with_client(
            http_client.clone(),
            current.feeds.urls(),
        ));

        let publisher = ReleasePublisher::new(
            store.clone(),
            messenger.clone(),
            downloader,
            DownloadOptions {
                save_path: current.downloader.save_path.clone(),
                category: current.downloader.category.clone(),
                max_size: current.pipeline.max_torrent_size,
            },
        );
        let nav = NavPublisher::new(
            store.clone(),
            metadata.clone(),
            messenger.clone(),
            PaginatedComposer::new(current.composer.clone()),
            ChatTarget::chat(current.telegram.nav_channel_id),
        );
        let processor = ReleaseProcessor::new(
            store.clone(),
            metadata,
            messenger.clone(),
            TitleParser::default(),
            publisher,
            nav,
            targets(&current),
        );
        let pipeline = Arc::new(IngestionPipeline::new(
            Arc::new(processor),
            current.pipeline.concurrency,
            current.pipeline.item_timeout(),
        ));

        tracing::info!(
            "Watching {} feeds with {} workers",
            feeds.feeds().len(),
            current.pipeline.concurrency
        );

        Ok(Self {
            config: Arc::new(config),
            settings: Arc::new(settings),
            http_client,
            store,
            messenger,
            feeds,
            pipeline,
        })
    }

    pub fn poll_scheduler(&self) -> PollScheduler {
        PollScheduler::new(self.feeds.clone(), self.pipeline.clone())
    }
}

fn targets(settings: &Settings) -> ProcessorTargets {
    ProcessorTargets {
        review: ChatTarget::thread(
            settings.telegram.admin_chat_id,
            settings.telegram.review_thread_id,
        ),
        release: ChatTarget::chat(settings.telegram.release_channel_id),
    }
}

/// Admin thread receiving forwarded errors.
pub fn error_target(settings: &Settings) -> ChatTarget {
    ChatTarget::thread(
        settings.telegram.admin_chat_id,
        settings.telegram.error_thread_id,
    )
}
