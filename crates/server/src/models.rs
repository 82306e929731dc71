mod release;
mod settings;

pub use release::{ChatTarget, ReleaseDraft, TorrentRecord, TorrentStatus};
pub use settings::{
    DownloaderSettings, FeedSettings, PipelineSettings, Settings, TelegramSettings,
};
