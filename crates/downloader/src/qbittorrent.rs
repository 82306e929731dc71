use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::sync::RwLock;

use crate::error::{DownloaderError, Result};
use crate::models::{AddTorrentOptions, DownloadedTorrent, TorrentInfo};
use crate::traits::Downloader;

/// qBittorrent WebUI downloader
pub struct QBittorrentDownloader {
    client: Client,
    base_url: String,
    username: String,
    password: String,
    sid: RwLock<Option<String>>,
    poll_interval: Duration,
    max_wait: Duration,
    sequence: AtomicU64,
}

impl QBittorrentDownloader {
    /// Create a new qBittorrent downloader
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            password: password.into(),
            sid: RwLock::new(None),
            poll_interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(30 * 60),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn with_timing(mut self, poll_interval: Duration, max_wait: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.max_wait = max_wait;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v2{}", self.base_url, path)
    }

    /// Login to qBittorrent WebUI
    /// POST /api/v2/auth/login
    pub async fn login(&self) -> Result<()> {
        let params = [
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
        ];
        let response = self
            .client
            .post(self.url("/auth/login"))
            .form(&params)
            .send()
            .await?;

        let status = response.status();

        // Extract SID from Set-Cookie header
        let sid = response
            .headers()
            .get(reqwest::header::SET_COOKIE)
            .and_then(|cookie| cookie.to_str().ok())
            .and_then(|cookie| cookie.split(';').next())
            .and_then(|s| s.strip_prefix("SID="))
            .map(ToString::to_string);

        let body = response.text().await.unwrap_or_default();

        if status.is_success() && body == "Ok." {
            *self.sid.write().await = sid;
            tracing::debug!("Successfully logged in to qBittorrent");
            Ok(())
        } else if body == "Fails." {
            Err(DownloaderError::Auth("Invalid username or password".into()))
        } else {
            Err(DownloaderError::Auth(format!(
                "Login failed: {} - {}",
                status.as_u16(),
                body
            )))
        }
    }

    /// Send an authenticated request, logging in again once if the session expired.
    async fn send<F>(&self, build: F) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        if self.sid.read().await.is_none() {
            self.login().await?;
        }

        let response = self.with_sid(build(&self.client)).await.send().await?;
        if response.status() != StatusCode::FORBIDDEN {
            return Ok(response);
        }

        tracing::debug!("qBittorrent session expired, logging in again");
        self.login().await?;
        Ok(self.with_sid(build(&self.client)).await.send().await?)
    }

    async fn with_sid(&self, request: RequestBuilder) -> RequestBuilder {
        match self.sid.read().await.as_ref() {
            Some(sid) => request.header(reqwest::header::COOKIE, format!("SID={}", sid)),
            None => request,
        }
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.as_u16() == 415 {
            return Err(DownloaderError::InvalidTorrent(
                "Invalid torrent URL or file".into(),
            ));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DownloaderError::Api {
                status_code: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    /// Add new torrent via URL
    /// POST /api/v2/torrents/add
    async fn add_torrent(&self, options: &AddTorrentOptions) -> Result<()> {
        let url = self.url("/torrents/add");
        let response = self
            .send(|client| {
                let mut form = Form::new().text("urls", options.url.clone());
                if let Some(path) = &options.save_path {
                    form = form.text("savepath", path.clone());
                }
                if let Some(category) = &options.category {
                    form = form.text("category", category.clone());
                }
                if !options.tags.is_empty() {
                    form = form.text("tags", options.tags.join(","));
                }
                if let Some(rename) = &options.rename {
                    form = form.text("rename", rename.clone());
                }
                client.post(&url).multipart(form)
            })
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Get torrents carrying a tag
    /// GET /api/v2/torrents/info
    async fn torrents_by_tag(&self, tag: &str) -> Result<Vec<TorrentInfo>> {
        let url = self.url("/torrents/info");
        let response = self
            .send(|client| client.get(&url).query(&[("tag", tag)]))
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Tag that identifies one download of this process
    fn next_tag(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("herald-{}-{}", millis, seq)
    }

    /// Poll the tagged torrent until it completes, fails or runs out of time.
    async fn wait_for(&self, tag: &str) -> Result<DownloadedTorrent> {
        let deadline = tokio::time::Instant::now() + self.max_wait;
        loop {
            let torrents = self.torrents_by_tag(tag).await?;
            if let Some(torrent) = torrents.into_iter().next() {
                if torrent.is_errored() {
                    return Err(DownloaderError::InvalidTorrent(format!(
                        "{} entered state {}",
                        torrent.name, torrent.state
                    )));
                }
                if torrent.is_complete() {
                    return Ok(DownloadedTorrent {
                        handle: torrent.hash,
                        total_size: torrent.total_size.max(0) as u64,
                        content_path: torrent.content_path,
                    });
                }
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(DownloaderError::Timeout(self.max_wait.as_secs()));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Delete every torrent carrying `tag` together with its files.
    async fn purge_tag(&self, tag: &str) -> Result<()> {
        for torrent in self.torrents_by_tag(tag).await? {
            self.remove(&torrent.hash, true).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Downloader for QBittorrentDownloader {
    async fn download(&self, options: AddTorrentOptions) -> Result<DownloadedTorrent> {
        let tag = self.next_tag();
        let options = options.add_tag(tag.clone());
        self.add_torrent(&options).await?;
        tracing::debug!("Added torrent {} with tag {}", options.url, tag);

        let result = self.wait_for(&tag).await;
        if let Err(e) = &result {
            tracing::debug!("Download of {} failed: {}", options.url, e);
            if let Err(purge) = self.purge_tag(&tag).await {
                tracing::warn!("Failed to remove unfinished torrent {}: {}", tag, purge);
            }
        }
        result
    }

    /// POST /api/v2/torrents/delete
    async fn remove(&self, handle: &str, delete_files: bool) -> Result<()> {
        let url = self.url("/torrents/delete");
        let delete_files = delete_files.to_string();
        let response = self
            .send(|client| {
                client
                    .post(&url)
                    .form(&[("hashes", handle), ("deleteFiles", delete_files.as_str())])
            })
            .await?;
        Self::check(response).await?;
        tracing::debug!("Removed torrent {}", handle);
        Ok(())
    }

    fn downloader_type(&self) -> &'static str {
        "qBittorrent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_url_building() {
        let downloader = QBittorrentDownloader::new("http://localhost:8080/", "admin", "pw");
        assert_eq!(
            downloader.url("/torrents/info"),
            "http://localhost:8080/api/v2/torrents/info"
        );
    }

    #[test]
    fn test_tags_are_unique() {
        let downloader = QBittorrentDownloader::new("http://localhost:8080", "admin", "pw");
        let a = downloader.next_tag();
        let b = downloader.next_tag();
        assert_ne!(a, b);
        assert!(a.starts_with("herald-"));
    }

    // ========================================================================
    // Download failures
    // ========================================================================

    async fn qbittorrent_with(torrent: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Set-Cookie", "SID=abc; HttpOnly")
                    .set_body_string("Ok."),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v2/torrents/add"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Ok."))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/torrents/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([torrent])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v2/torrents/delete"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_timed_out_download_is_deleted() {
        let server = qbittorrent_with(serde_json::json!({
            "hash": "h1",
            "name": "episode.mp4",
            "progress": 0.4,
            "state": "downloading"
        }))
        .await;
        let downloader = QBittorrentDownloader::new(server.uri(), "admin", "pw")
            .with_timing(Duration::from_millis(10), Duration::ZERO);

        let result = downloader
            .download(AddTorrentOptions::new("magnet:?xt=urn:btih:h1"))
            .await;

        assert!(matches!(result, Err(DownloaderError::Timeout(0))));
    }

    #[tokio::test]
    async fn test_errored_download_is_deleted() {
        let server = qbittorrent_with(serde_json::json!({
            "hash": "h2",
            "name": "episode.mp4",
            "progress": 0.0,
            "state": "error"
        }))
        .await;
        let downloader = QBittorrentDownloader::new(server.uri(), "admin", "pw")
            .with_timing(Duration::from_millis(10), Duration::from_secs(5));

        let result = downloader
            .download(AddTorrentOptions::new("magnet:?xt=urn:btih:h2"))
            .await;

        assert!(matches!(result, Err(DownloaderError::InvalidTorrent(_))));
    }
}
