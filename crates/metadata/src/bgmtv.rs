use reqwest::Client;

use crate::error::ProviderError;
use crate::models::{
    EpisodesResponse, EpisodeType, SearchFilter, SearchSubjectsRequest, SearchSubjectsResponse,
    SubjectDetail, SubjectType,
};

const BASE_URL: &str = "https://api.bgm.tv";
pub(crate) const USER_AGENT: &str = "herald/fansub-feed-watcher";

/// BGM.tv API client
pub struct BgmtvClient {
    client: Client,
    base_url: String,
}

impl BgmtvClient {
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at another API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Search subjects
    /// POST /v0/search/subjects
    pub async fn search_subjects(
        &self,
        request: &SearchSubjectsRequest,
    ) -> crate::Result<SearchSubjectsResponse> {
        let response = self
            .client
            .post(self.url("/v0/search/subjects"))
            .header("User-Agent", USER_AGENT)
            .json(request)
            .send()
            .await?;
        handle_response(response).await
    }

    /// Search anime that already started airing.
    pub async fn search_anime(
        &self,
        keyword: impl Into<String>,
    ) -> crate::Result<SearchSubjectsResponse> {
        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let request = SearchSubjectsRequest {
            keyword: keyword.into(),
            filter: Some(SearchFilter {
                subject_type: Some(vec![SubjectType::Anime]),
                air_date: Some(vec![format!("<={}", today)]),
            }),
        };
        self.search_subjects(&request).await
    }

    /// Get subject details by ID
    /// GET /v0/subjects/{subject_id}
    pub async fn get_subject(&self, subject_id: i64) -> crate::Result<SubjectDetail> {
        let response = self
            .client
            .get(self.url(&format!("/v0/subjects/{}", subject_id)))
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;
        handle_response(response).await
    }

    /// Get the main episodes of a subject
    /// GET /v0/episodes?subject_id={subject_id}&type=0
    pub async fn get_episodes(&self, subject_id: i64) -> crate::Result<EpisodesResponse> {
        let response = self
            .client
            .get(self.url("/v0/episodes"))
            .query(&[
                ("subject_id", subject_id),
                ("type", EpisodeType::Main as i64),
            ])
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;
        handle_response(response).await
    }
}

pub(crate) async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> crate::Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api {
            status_code: status.as_u16(),
            message,
        });
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
