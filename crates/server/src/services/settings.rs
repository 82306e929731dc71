use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::models::Settings;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// TOML-backed settings with an in-memory cache
pub struct SettingsService {
    settings_path: PathBuf,
    cache: Arc<RwLock<Settings>>,
}

impl SettingsService {
    /// Load settings, writing a default file on first start.
    pub async fn new(config: &Config) -> Result<Self, SettingsError> {
        let settings_path = config.settings_path();
        let settings = Self::load_or_create(&settings_path).await?;

        Ok(Self {
            settings_path,
            cache: Arc::new(RwLock::new(settings)),
        })
    }

    async fn load_or_create(path: &Path) -> Result<Settings, SettingsError> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let settings: Settings = toml::from_str(&content)?;
                tracing::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }

                let default = Settings::default();
                tokio::fs::write(path, toml::to_string_pretty(&default)?).await?;
                tracing::info!("Created default settings file at {}", path.display());
                Ok(default)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Current settings from cache.
    pub async fn get(&self) -> Settings {
        self.cache.read().await.clone()
    }

    /// Replace settings. The cache changes only after the file is written.
    pub async fn save(&self, settings: Settings) -> Result<(), SettingsError> {
        let toml_str = toml::to_string_pretty(&settings)?;

        let tmp_path = self.settings_path.with_extension("toml.tmp");
        tokio::fs::write(&tmp_path, &toml_str).await?;
        tokio::fs::rename(&tmp_path, &self.settings_path).await?;

        *self.cache.write().await = settings;
        tracing::debug!("Saved settings to {}", self.settings_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str) -> Config {
        let dir = std::env::temp_dir().join(format!("herald-settings-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        Config::new(dir)
    }

    #[tokio::test]
    async fn test_creates_default_file() {
        let config = temp_config("default");
        let service = SettingsService::new(&config).await.unwrap();

        assert!(config.settings_path().exists());
        assert_eq!(service.get().await.pipeline.concurrency, 3);
    }

    #[tokio::test]
    async fn test_save_then_reload() {
        let config = temp_config("reload");
        let service = SettingsService::new(&config).await.unwrap();

        let mut settings = service.get().await;
        settings.telegram.bot_token = "123:abc".into();
        settings.pipeline.concurrency = 5;
        service.save(settings).await.unwrap();
        assert_eq!(service.get().await.pipeline.concurrency, 5);

        let reloaded = SettingsService::new(&config).await.unwrap().get().await;
        assert_eq!(reloaded.telegram.bot_token, "123:abc");
        assert_eq!(reloaded.pipeline.concurrency, 5);
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let config = temp_config("partial");
        tokio::fs::create_dir_all(&config.data_dir).await.unwrap();
        tokio::fs::write(config.settings_path(), "[telegram]\nadmin_chat_id = -1001\n")
            .await
            .unwrap();

        let settings = SettingsService::new(&config).await.unwrap().get().await;
        assert_eq!(settings.telegram.admin_chat_id, -1001);
        assert_eq!(settings.telegram.api_url, "https://api.telegram.org");
        assert_eq!(settings.downloader.username, "admin");
    }

    #[tokio::test]
    async fn test_invalid_toml_is_an_error() {
        let config = temp_config("invalid");
        tokio::fs::create_dir_all(&config.data_dir).await.unwrap();
        tokio::fs::write(config.settings_path(), "[telegram\n").await.unwrap();

        let result = SettingsService::new(&config).await;
        assert!(matches!(result, Err(SettingsError::Parse(_))));
    }
}
