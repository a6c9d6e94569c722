use crate::traits::AdDataSource;
use crate::types::{AdSourceConfig, AdsResponse, NewsdeskError, QuerySpec, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

/// REST ad data source: `GET {base}/ads?{query}` answering `{"ads": [...]}`.
pub struct HttpAdSource {
    client: Client,
    config: AdSourceConfig,
}

impl HttpAdSource {
    pub fn new(config: AdSourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .gzip(true)
            .build()
            .map_err(NewsdeskError::Network)?;

        Ok(Self { client, config })
    }

    pub fn ads_url(&self, query: &QuerySpec) -> Result<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/ads", base))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        Ok(url)
    }
}

#[async_trait]
impl AdDataSource for HttpAdSource {
    fn source_name(&self) -> String {
        format!("Ad API ({})", self.config.base_url)
    }

    async fn fetch_ads(&self, query: &QuerySpec) -> Result<AdsResponse> {
        let url = self.ads_url(query)?;
        let start_time = Instant::now();
        debug!("Fetching ads: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(NewsdeskError::Network)?;

        let status = response.status();
        let body = response.text().await.map_err(NewsdeskError::Network)?;
        if !status.is_success() {
            let message = error_message(status, &body);
            warn!("Ad API returned {} in {}ms: {}", status, start_time.elapsed().as_millis(), message);
            return Err(NewsdeskError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let ads: AdsResponse = serde_json::from_str(&body)?;

        info!(
            "Fetched {} ads in {}ms",
            ads.ads.len(),
            start_time.elapsed().as_millis()
        );
        Ok(ads)
    }
}

/// `{"message": ...}` or `{"error": ...}` (string or `{"message": ...}`),
/// otherwise the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|value| {
            value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(|field| field.as_str().or_else(|| field.get("message").and_then(Value::as_str)))
        })
        .map(str::to_string)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string())
}
