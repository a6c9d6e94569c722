use crate::news_query::{article_params, NewsQuery};
use crate::traits::ContentSource;
use crate::types::{
    ContentApiConfig, GuardianArticle, GuardianErrorResponse, GuardianList, GuardianListResponse,
    GuardianSection, GuardianSingleResponse, NewsdeskError, Result,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

/// Client for the Guardian content API.
///
/// Every request carries the `api-key` query parameter and is bounded by the
/// configured timeout; a timeout surfaces as [`NewsdeskError::Network`].
pub struct ContentFetcher {
    client: Client,
    config: ContentApiConfig,
}

impl ContentFetcher {
    pub fn new(config: ContentApiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(NewsdeskError::Config("content API key is empty".to_string()));
        }

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()
            .map_err(NewsdeskError::Network)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ContentApiConfig {
        &self.config
    }

    /// Full request URL for `path` with `params` and the API key appended.
    pub fn endpoint_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/{}", base, path.trim_start_matches('/')))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api-key", &self.config.api_key);
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = self.endpoint_url(path, params)?;
        let start_time = Instant::now();

        debug!("GET {} ({} params)", path, params.len());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(NewsdeskError::Network)?;

        let status = response.status();
        let body = response.text().await.map_err(NewsdeskError::Network)?;
        let elapsed_ms = start_time.elapsed().as_millis() as u64;

        if !status.is_success() {
            let message = upstream_message(status, &body);
            warn!("Content API {} returned {} in {}ms: {}", path, status, elapsed_ms, message);
            return Err(NewsdeskError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Content API {} answered in {}ms ({} bytes)", path, elapsed_ms, body.len());
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn search_articles(&self, query: &NewsQuery) -> Result<GuardianList<GuardianArticle>> {
        let envelope: GuardianListResponse<GuardianArticle> =
            self.get_json("search", &query.to_params()).await?;
        info!(
            "Fetched {} articles (page {} of {}, {} total)",
            envelope.response.results.len(),
            envelope.response.current_page,
            envelope.response.pages,
            envelope.response.total
        );
        Ok(envelope.response)
    }

    pub async fn article_by_id(&self, id: &str) -> Result<GuardianArticle> {
        let id = id.trim().trim_matches('/');
        if id.is_empty() {
            return Err(NewsdeskError::Validation("article id is empty".to_string()));
        }

        let envelope: GuardianSingleResponse = match self.get_json(id, &article_params()).await {
            Ok(envelope) => envelope,
            Err(NewsdeskError::Upstream { status: 404, .. }) => {
                return Err(NewsdeskError::NotFound { id: id.to_string() });
            }
            Err(e) => return Err(e),
        };

        envelope
            .response
            .content
            .ok_or_else(|| NewsdeskError::NotFound { id: id.to_string() })
    }

    pub async fn list_sections(&self) -> Result<Vec<GuardianSection>> {
        let envelope: GuardianListResponse<GuardianSection> = self.get_json("sections", &[]).await?;
        info!("Fetched {} sections", envelope.response.results.len());
        Ok(envelope.response.results)
    }
}

/// Prefer the API's own error message, fall back to the status reason.
fn upstream_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<GuardianErrorResponse>(body)
        .map(|err| err.response.message)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown").to_string())
}

#[async_trait]
impl ContentSource for ContentFetcher {
    async fn search(&self, query: &NewsQuery) -> Result<GuardianList<GuardianArticle>> {
        self.search_articles(query).await
    }

    async fn article(&self, id: &str) -> Result<GuardianArticle> {
        self.article_by_id(id).await
    }

    async fn sections(&self) -> Result<Vec<GuardianSection>> {
        self.list_sections().await
    }
}
