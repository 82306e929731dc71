use reqwest::Client;
use serde::Serialize;

use crate::bgmtv::{USER_AGENT, handle_response};
use crate::models::{Tag, Team, TorrentDetail};

const BASE_URL: &str = "https://bangumi.moe";

#[derive(Serialize)]
struct FetchOne<'a> {
    #[serde(rename = "_id")]
    id: &'a str,
}

#[derive(Serialize)]
struct FetchMany<'a> {
    #[serde(rename = "_ids")]
    ids: &'a [String],
}

/// bangumi.moe API client
pub struct BangumiMoeClient {
    client: Client,
    base_url: String,
}

impl BangumiMoeClient {
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST /api/torrent/fetch
    pub async fn torrent(&self, id: &str) -> crate::Result<TorrentDetail> {
        let response = self
            .client
            .post(self.url("/api/torrent/fetch"))
            .header("User-Agent", USER_AGENT)
            .json(&FetchOne { id })
            .send()
            .await?;
        handle_response(response).await
    }

    /// POST /api/team/fetch
    pub async fn teams(&self, ids: &[String]) -> crate::Result<Vec<Team>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .client
            .post(self.url("/api/team/fetch"))
            .header("User-Agent", USER_AGENT)
            .json(&FetchMany { ids })
            .send()
            .await?;
        handle_response(response).await
    }

    /// POST /api/tag/fetch
    pub async fn tags(&self, ids: &[String]) -> crate::Result<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .client
            .post(self.url("/api/tag/fetch"))
            .header("User-Agent", USER_AGENT)
            .json(&FetchMany { ids })
            .send()
            .await?;
        handle_response(response).await
    }
}
