//! Fansub feed watcher service
//!
//! Polls release feeds, runs every new item through the ingestion
//! pipeline and publishes releases with their per-show navigation cards.

pub mod config;
pub mod ingestion;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod telegram;

pub use config::Config;
pub use services::{ErrorNotifierLayer, ErrorReceiver, SettingsService, create_error_channel};
pub use state::AppState;

/// Run the watcher until Ctrl-C.
///
/// `errors` receives the ERROR events captured by [`ErrorNotifierLayer`];
/// they are posted to the admin error thread.
pub async fn run_watcher(
    config: Config,
    errors: ErrorReceiver,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = SettingsService::new(&config).await?;
    let current = settings.get().await;
    if current.telegram.bot_token.is_empty() {
        return Err(format!(
            "telegram.bot_token is not set in {}",
            config.settings_path().display()
        )
        .into());
    }

    let state = AppState::new(config, settings).await?;
    services::start_notifier(
        errors,
        state.messenger.clone(),
        state::error_target(&current),
    );
    let poller = state.poll_scheduler().start();

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    poller.abort();
    Ok(())
}
